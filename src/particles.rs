//! Decorative particle field drawn over the orb.
//!
//! Positions are in surface pixels with the origin at the top-left corner.
//! Each particle floats around its anchor along a fixed keyframe path.

use crate::config::ParticleConfig;
use crate::random::RandomSource;

/// Drift keyframes in pixels, evenly spaced over one period.
const DRIFT_PATH: [(f32, f32); 5] = [
    (0.0, 0.0),
    (10.0, -20.0),
    (20.0, 0.0),
    (10.0, 20.0),
    (0.0, 0.0),
];

/// Floats per particle in [`ParticleField::write_vertices`] output:
/// x, y, size, opacity, accent.
pub const PARTICLE_STRIDE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    /// Seconds per drift cycle.
    pub period: f32,
    /// Which of the palette's two particle colors to use.
    pub accent: bool,
}

impl Particle {
    /// Drift offset from the anchor at `elapsed` seconds.
    pub fn drift(&self, elapsed: f64) -> (f32, f32) {
        let period = self.period.max(f32::EPSILON) as f64;
        let phase = (elapsed.rem_euclid(period) / period) as f32;
        let segments = (DRIFT_PATH.len() - 1) as f32;
        let scaled = phase * segments;
        let index = (scaled as usize).min(DRIFT_PATH.len() - 2);
        let t = smooth(scaled - index as f32);
        let (x0, y0) = DRIFT_PATH[index];
        let (x1, y1) = DRIFT_PATH[index + 1];
        (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t)
    }
}

// CSS `ease-in-out` is close enough to smoothstep at this scale.
fn smooth(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: u32,
    height: u32,
}

impl ParticleField {
    /// Scatter particles uniformly over a `width` x `height` surface. Narrow
    /// surfaces get fewer particles, see [`ParticleConfig::count_for_width`].
    pub fn generate(
        width: u32,
        height: u32,
        config: &ParticleConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let count = config.count_for_width(width);
        Self::generate_count(count, width, height, config, rng)
    }

    pub fn generate_count(
        count: usize,
        width: u32,
        height: u32,
        config: &ParticleConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let particles = (0..count)
            .map(|_| {
                let x = rng.next_f32() * width as f32;
                let y = rng.next_f32() * height as f32;
                let size = rng.range(config.min_size, config.max_size);
                let opacity = rng.range(config.min_opacity, config.max_opacity);
                let period = rng.range(config.min_period, config.max_period);
                let accent = rng.coin();
                Particle {
                    x,
                    y,
                    size,
                    opacity,
                    period,
                    accent,
                }
            })
            .collect();
        ParticleField {
            particles,
            width,
            height,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fill `out` with interleaved vertex data at `elapsed` seconds, reusing
    /// its allocation.
    pub fn write_vertices(&self, elapsed: f64, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.particles.len() * PARTICLE_STRIDE);
        for p in &self.particles {
            let (dx, dy) = p.drift(elapsed);
            let accent = if p.accent { 1.0 } else { 0.0 };
            out.extend_from_slice(&[p.x + dx, p.y + dy, p.size, p.opacity, accent]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(period: f32) -> Particle {
        Particle {
            x: 0.0,
            y: 0.0,
            size: 2.0,
            opacity: 0.5,
            period,
            accent: false,
        }
    }

    #[test]
    fn drift_hits_keyframes() {
        let p = particle(20.0);
        assert_eq!(p.drift(0.0), (0.0, 0.0));
        assert_eq!(p.drift(5.0), (10.0, -20.0));
        assert_eq!(p.drift(10.0), (20.0, 0.0));
        assert_eq!(p.drift(15.0), (10.0, 20.0));
        assert_eq!(p.drift(20.0), (0.0, 0.0));
    }

    #[test]
    fn drift_stays_inside_path_bounds() {
        let p = particle(13.0);
        for i in 0..400 {
            let (dx, dy) = p.drift(i as f64 * 0.1);
            assert!((0.0..=20.0).contains(&dx));
            assert!((-20.0..=20.0).contains(&dy));
        }
    }
}
