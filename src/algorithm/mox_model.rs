use super::SRAW_STD_BONUS;

/// Normalizes the raw signal against the learned baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoxModel {
    sraw_std: f32,
    sraw_mean: f32,
    gain: f32,
}

impl MoxModel {
    pub fn new(sraw_std: f32, sraw_mean: f32, gain: f32) -> MoxModel {
        MoxModel {
            sraw_std,
            sraw_mean,
            gain,
        }
    }

    pub fn set_parameters(&mut self, sraw_std: f32, sraw_mean: f32) {
        self.sraw_std = sraw_std;
        self.sraw_mean = sraw_mean;
    }

    /// Larger raw values mean cleaner air, hence the negated denominator.
    pub fn process(&self, sraw: f32) -> f32 {
        ((sraw - self.sraw_mean) / (-(self.sraw_std + SRAW_STD_BONUS))) * self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::INDEX_GAIN;

    #[test]
    fn baseline_maps_to_zero() {
        let model = MoxModel::new(50.0, 10_000.0, INDEX_GAIN);
        assert_eq!(model.process(10_000.0), 0.0);
    }

    #[test]
    fn lower_raw_value_is_positive() {
        let model = MoxModel::new(50.0, 10_000.0, INDEX_GAIN);
        // -- 270 below the mean is exactly one (std + bonus) unit
        assert!((model.process(9_730.0) - INDEX_GAIN).abs() < 1e-3);
        assert!(model.process(10_270.0) < 0.0);
    }

    #[test]
    fn parameters_can_be_refreshed() {
        let mut model = MoxModel::new(50.0, 0.0, 100.0);
        model.set_parameters(30.0, 500.0);
        assert!((model.process(250.0) - 100.0).abs() < 1e-3);
    }
}
