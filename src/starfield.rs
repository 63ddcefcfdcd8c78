//! Skill starfield: one star per skill, faint constellation lines between
//! nearby stars, and click hit-testing.

use crate::config::Skill;
use crate::random::RandomSource;

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
    pub brightness: f32,
    /// Index into the skill list.
    pub skill: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub opacity: f32,
}

/// Connection lines fade out linearly up to this opacity at zero distance.
const CONNECTION_OPACITY: f32 = 0.2;
/// A click counts as a hit within this many star radii.
const HIT_RADIUS_FACTOR: f32 = 5.0;

#[derive(Clone, Debug)]
pub struct Starfield {
    skills: Vec<Skill>,
    stars: Vec<Star>,
    connections: Vec<Connection>,
    width: u32,
    height: u32,
}

impl Starfield {
    pub fn generate(
        skills: Vec<Skill>,
        width: u32,
        height: u32,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let stars = (0..skills.len())
            .map(|skill| Star {
                x: rng.next_f32() * width as f32,
                y: rng.next_f32() * height as f32,
                z: rng.next_f32() * 1000.0,
                size: rng.range(2.0, 5.0),
                brightness: rng.range(0.5, 1.0),
                skill,
            })
            .collect();
        let mut field = Starfield {
            skills,
            stars,
            connections: Vec::new(),
            width,
            height,
        };
        field.connect();
        field
    }

    /// Move every star to a fresh position inside the new bounds and rebuild
    /// the constellation lines.
    pub fn resize(&mut self, width: u32, height: u32, rng: &mut dyn RandomSource) {
        self.width = width;
        self.height = height;
        for star in &mut self.stars {
            star.x = rng.next_f32() * width as f32;
            star.y = rng.next_f32() * height as f32;
        }
        self.connect();
        log::debug!("starfield resized to {width}x{height}, {} links", self.connections.len());
    }

    fn connect(&mut self) {
        self.connections.clear();
        let reach = self.width as f32 / 3.0;
        if reach <= 0.0 {
            return;
        }
        for i in 0..self.stars.len() {
            for j in i + 1..self.stars.len() {
                let (a, b) = (&self.stars[i], &self.stars[j]);
                let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                if distance < reach {
                    self.connections.push(Connection {
                        from: i,
                        to: j,
                        opacity: CONNECTION_OPACITY - (distance / reach) * CONNECTION_OPACITY,
                    });
                }
            }
        }
    }

    /// First star whose hit circle contains the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&Star> {
        self.stars.iter().find(|star| {
            let distance = ((star.x - x).powi(2) + (star.y - y).powi(2)).sqrt();
            distance < star.size * HIT_RADIUS_FACTOR
        })
    }

    pub fn skill(&self, star: &Star) -> Option<&Skill> {
        self.skills.get(star.skill)
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
