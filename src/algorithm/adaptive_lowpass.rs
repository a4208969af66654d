use super::{LP_ALPHA, LP_TAU_FAST, LP_TAU_SLOW};

/// Adaptive lowpass filter state.
///
/// Two fixed time constant taps (`x1` fast, `x2` slow) drive the time constant
/// of the published tap `x3`: when they diverge the filter follows quickly,
/// when they agree it smooths with the slow time constant.
#[derive(Clone, Debug, PartialEq)]
pub struct LowpassState {
    pub a1: f32,
    pub a2: f32,
    pub initialized: bool,
    pub x1: f32,
    pub x2: f32,
    pub x3: f32,
    sampling_interval: f32,
}

impl LowpassState {
    pub fn new(sampling_interval: f32) -> LowpassState {
        LowpassState {
            a1: sampling_interval / (LP_TAU_FAST + sampling_interval),
            a2: sampling_interval / (LP_TAU_SLOW + sampling_interval),
            initialized: false,
            x1: 0.0,
            x2: 0.0,
            x3: 0.0,
            sampling_interval,
        }
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        // -- first sample seeds all taps, no start-up transient
        if !self.initialized {
            self.x1 = sample;
            self.x2 = sample;
            self.x3 = sample;
            self.initialized = true;
        }
        self.x1 = ((1.0 - self.a1) * self.x1) + (self.a1 * sample);
        self.x2 = ((1.0 - self.a2) * self.x2) + (self.a2 * sample);

        let abs_delta = (self.x1 - self.x2).abs();
        let f1 = (LP_ALPHA * abs_delta).exp();
        let tau_a = ((LP_TAU_SLOW - LP_TAU_FAST) * f1) + LP_TAU_FAST;
        let a3 = self.sampling_interval / (self.sampling_interval + tau_a);
        self.x3 = ((1.0 - a3) * self.x3) + (a3 * sample);
        self.x3
    }

    pub fn output(&self) -> f32 {
        self.x3
    }
}
