use glam::Vec2;

/// Transient input state read by the render step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewState {
    pointer: Vec2,
}

impl ViewState {
    /// Record a normalized pointer position. Components are clamped to
    /// [-1, 1]; non-finite components keep their previous value.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        if x.is_finite() {
            self.pointer.x = x.clamp(-1.0, 1.0);
        }
        if y.is_finite() {
            self.pointer.y = y.clamp(-1.0, 1.0);
        }
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }
}

/// Map a client-space position to normalized coordinates: x grows right,
/// y grows up, both in [-1, 1] inside the viewport.
pub fn normalize_pointer(client_x: f64, client_y: f64, width: f64, height: f64) -> (f32, f32) {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let x = (client_x / width) * 2.0 - 1.0;
    let y = -(client_y / height) * 2.0 + 1.0;
    (x as f32, y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_corners_and_center() {
        assert_eq!(normalize_pointer(0.0, 0.0, 800.0, 600.0), (-1.0, 1.0));
        assert_eq!(normalize_pointer(400.0, 300.0, 800.0, 600.0), (0.0, 0.0));
        assert_eq!(normalize_pointer(800.0, 600.0, 800.0, 600.0), (1.0, -1.0));
    }

    #[test]
    fn zero_sized_viewport_does_not_divide_by_zero() {
        let (x, y) = normalize_pointer(10.0, 10.0, 0.0, 0.0);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn clamps_and_ignores_non_finite() {
        let mut view = ViewState::default();
        view.set_pointer(3.0, -7.5);
        assert_eq!(view.pointer(), Vec2::new(1.0, -1.0));
        view.set_pointer(f32::NAN, 0.25);
        assert_eq!(view.pointer(), Vec2::new(1.0, 0.25));
    }
}
