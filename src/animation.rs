//! Per-frame motion: eased color transitions, the frame clock, and the orb's
//! pointer-following rotation.

use glam::{Mat4, Vec2};

use crate::color::Color;
use crate::config::MotionConfig;

/// Longest step the clock reports, in seconds. Larger gaps (hidden tabs,
/// breakpoints) are treated as one short frame.
pub const MAX_FRAME_DT: f64 = 0.1;

/// Cubic ease-in-out on `t` in [0, 1].
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Color that eases from its value at retarget time toward a target over a
/// fixed number of frames. The target is visible immediately via
/// [`ColorTransition::target`].
#[derive(Clone, Copy, Debug)]
pub struct ColorTransition {
    from: Color,
    to: Color,
    frame: u32,
    frames: u32,
}

impl ColorTransition {
    pub fn settled(color: Color, frames: u32) -> Self {
        ColorTransition {
            from: color,
            to: color,
            frame: frames,
            frames,
        }
    }

    pub fn retarget(&mut self, to: Color) {
        self.from = self.current();
        self.to = to;
        self.frame = 0;
    }

    pub fn step(&mut self) {
        if self.frame < self.frames {
            self.frame += 1;
        }
    }

    pub fn current(&self) -> Color {
        if self.frames == 0 || self.frame >= self.frames {
            return self.to;
        }
        let t = ease_in_out(self.frame as f32 / self.frames as f32);
        self.from.lerp(self.to, t)
    }

    pub fn target(&self) -> Color {
        self.to
    }

    pub fn is_settled(&self) -> bool {
        self.frames == 0 || self.frame >= self.frames
    }
}

/// Converts `requestAnimationFrame` timestamps (milliseconds) into frame
/// deltas and total elapsed time.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    elapsed: f64,
    frames: u64,
}

impl FrameClock {
    /// Returns the clamped delta in seconds. The first tick reports zero.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_ms {
            Some(last) if now_ms.is_finite() => ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        self.elapsed += dt;
        self.frames += 1;
        dt
    }

    /// Seconds of animated time, excluding clamped gaps.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Orb orientation: a free-running spin plus a tilt that eases toward the
/// pointer.
///
/// The tilt update is `tilt += ease * (target - tilt)`, so with `ease` in
/// (0, 1] it approaches the target monotonically and never passes it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbMotion {
    spin: Vec2,
    tilt: Vec2,
}

impl OrbMotion {
    /// Advance one frame toward the tilt implied by `pointer` (normalized, x/y).
    pub fn step(&mut self, pointer: Vec2, motion: &MotionConfig) {
        self.spin += Vec2::from(motion.base_spin);
        let target = Self::tilt_target(pointer, motion);
        self.tilt += motion.ease_factor * (target - self.tilt);
    }

    /// Pointer x turns the orb around its y axis and pointer y around x, so
    /// the returned vector is (rotation.x, rotation.y).
    pub fn tilt_target(pointer: Vec2, motion: &MotionConfig) -> Vec2 {
        Vec2::new(pointer.y, pointer.x) * motion.pointer_influence
    }

    /// Current tilt as (rotation.x, rotation.y) in radians.
    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    pub fn spin(&self) -> Vec2 {
        self.spin
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.tilt.x)
            * Mat4::from_rotation_y(self.tilt.y)
            * Mat4::from_rotation_x(self.spin.x)
            * Mat4::from_rotation_y(self.spin.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clock_clamps_long_gaps() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(1000.0), 0.0);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-9);
        assert_eq!(clock.tick(61_016.0), MAX_FRAME_DT);
        assert!((clock.elapsed() - 0.116).abs() < 1e-9);
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn transition_reaches_target_after_configured_frames() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let mut t = ColorTransition::settled(red, 4);
        t.retarget(blue);
        assert_eq!(t.target(), blue);
        assert_eq!(t.current(), red);
        for _ in 0..3 {
            t.step();
            assert!(!t.is_settled());
        }
        t.step();
        assert!(t.is_settled());
        assert_eq!(t.current(), blue);
    }
}
