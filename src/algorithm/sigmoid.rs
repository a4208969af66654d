use super::{INDEX_OFFSET_DEFAULT, SIGMOID_K, SIGMOID_L, SIGMOID_X0};

// -- beyond these exponents the logistic is saturated, exp() is not evaluated
const SATURATION_LOWER: f32 = -50.0;
const SATURATION_UPPER: f32 = 50.0;

/// Logistic function `l / (1 + exp(k * (sample - x0)))`, saturated to `l` or `0`
/// when the exponent leaves `[-50, 50]`.
pub fn sigmoid(l: f32, x0: f32, k: f32, sample: f32) -> f32 {
    let x = k * (sample - x0);
    if x < SATURATION_LOWER {
        l
    } else if x > SATURATION_UPPER {
        0.0
    } else {
        l / (1.0 + x.exp())
    }
}

/// Parameterized sigmoid gate used by the mean variance estimator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sigmoid {
    l: f32,
    x0: f32,
    k: f32,
}

impl Sigmoid {
    pub fn new(l: f32, x0: f32, k: f32) -> Sigmoid {
        Sigmoid { l, x0, k }
    }

    /// Unit-height gate, the form every estimator gate takes.
    pub fn unit(x0: f32, k: f32) -> Sigmoid {
        Sigmoid::new(1.0, x0, k)
    }

    pub fn process(&self, sample: f32) -> f32 {
        sigmoid(self.l, self.x0, self.k, sample)
    }

    /// Same as `process`, but closed (returns 0) while the caller is not calibrating.
    /// A closed gate freezes baseline learning.
    pub fn gate(&self, sample: f32, calibrating: bool) -> f32 {
        if !calibrating {
            return 0.0;
        }
        self.process(sample)
    }
}

/// Maps the unscaled mox model output onto the `[0, 500]` index range,
/// anchored so that a sample sitting on the learned baseline lands on `index_offset`.
pub fn sigmoid_scaled(sample: f32, index_offset: f32) -> f32 {
    let x = SIGMOID_K * (sample - SIGMOID_X0);
    if x < SATURATION_LOWER {
        SIGMOID_L
    } else if x > SATURATION_UPPER {
        0.0
    } else if sample >= 0.0 {
        let shift = (SIGMOID_L - (5.0 * index_offset)) / 4.0;
        ((SIGMOID_L + shift) / (1.0 + x.exp())) - shift
    } else {
        (index_offset / INDEX_OFFSET_DEFAULT) * (SIGMOID_L / (1.0 + x.exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_half_height_at_midpoint() {
        assert_eq!(sigmoid(1.0, 10.0, 0.5, 10.0), 0.5);
        assert_eq!(sigmoid(500.0, -3.0, -0.01, -3.0), 250.0);
    }

    #[test]
    fn sigmoid_saturates_outside_exponent_window() {
        // -- k * (sample - x0) = -60
        assert_eq!(sigmoid(1.0, 0.0, 1.0, -60.0), 1.0);
        // -- k * (sample - x0) = 60
        assert_eq!(sigmoid(1.0, 0.0, 1.0, 60.0), 0.0);
        // -- exactly on the boundary the formula is still evaluated
        let at_boundary = sigmoid(1.0, 0.0, 1.0, 50.0);
        assert!(at_boundary > 0.0 && at_boundary < 1e-20);
    }

    #[test]
    fn closed_gate_returns_zero() {
        let gate = Sigmoid::unit(2700.0, 0.01);
        assert!(gate.gate(0.0, true) > 0.99);
        assert_eq!(gate.gate(0.0, false), 0.0);
    }

    #[test]
    fn scaled_sigmoid_anchors_baseline_to_index_offset() {
        let at_default = sigmoid_scaled(0.0, INDEX_OFFSET_DEFAULT);
        assert!((at_default - 100.0).abs() < 0.5, "got {at_default}");

        let at_250 = sigmoid_scaled(0.0, 250.0);
        assert!((at_250 - 250.0).abs() < 0.5, "got {at_250}");
    }

    #[test]
    fn scaled_sigmoid_branches_meet_at_zero_for_default_offset() {
        let above = sigmoid_scaled(0.0, INDEX_OFFSET_DEFAULT);
        let below = sigmoid_scaled(-f32::EPSILON, INDEX_OFFSET_DEFAULT);
        assert!((above - below).abs() < 1e-3);
    }

    #[test]
    fn scaled_sigmoid_saturates() {
        assert_eq!(sigmoid_scaled(10_000.0, INDEX_OFFSET_DEFAULT), SIGMOID_L);
        assert_eq!(sigmoid_scaled(-10_000.0, INDEX_OFFSET_DEFAULT), 0.0);
    }
}
