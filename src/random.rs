/// Uniform random numbers for particle and star placement.
pub trait RandomSource {
    /// A value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// A value in `[low, high)`.
    fn range(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    fn coin(&mut self) -> bool {
        self.next_f32() > 0.5
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f32(&mut self) -> f32 {
        self.f32()
    }
}

/// Replays a fixed list of values, wrapping around. Values are clamped into
/// `[0, 1)`; an empty list yields zeros.
#[derive(Clone, Debug)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f32>) -> Self {
        SequenceSource { values, cursor: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_f32(&mut self) -> f32 {
        let v = match self.values.len() {
            0 => 0.0,
            len => self.values[self.cursor % len],
        };
        self.cursor += 1;
        v.clamp(0.0, 1.0 - f32::EPSILON)
    }
}

/// Generator seeded from the environment: `Math.random` in the browser, the
/// process entropy elsewhere.
pub fn from_entropy() -> fastrand::Rng {
    #[cfg(target_arch = "wasm32")]
    {
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        fastrand::Rng::with_seed(seed)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        fastrand::Rng::new()
    }
}
