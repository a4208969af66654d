use serde::{Deserialize, Serialize};

use super::{
    GATING_MAX_DURATION_MINUTES, INDEX_GAIN, INDEX_OFFSET_DEFAULT, SRAW_STD_INITIAL,
    TAU_MEAN_HOURS, TAU_VARIANCE_HOURS,
};
use crate::errors::GasIndexError;

/// Tuning of the gas index algorithm.
///
/// Changing any of these re-derives the learning rates and resets the
/// algorithm, see [`GasIndexAlgorithm::set_tuning_parameters`].
///
/// [`GasIndexAlgorithm::set_tuning_parameters`]: super::GasIndexAlgorithm::set_tuning_parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningParameters {
    /// Index representing typical (average) conditions.
    pub index_offset: f32,
    /// Time constant of the long-term mean estimate, in hours.
    pub learning_time_offset_hours: f32,
    /// Time constant of the long-term variance estimate, in hours.
    pub learning_time_gain_hours: f32,
    /// Maximum duration of gating (freeze of the estimator during high index), in minutes.
    pub gating_max_duration_minutes: f32,
    /// Initial estimate of the standard deviation.
    pub std_initial: f32,
    /// Gain applied to the normalized raw signal.
    pub gain_factor: f32,
}

impl Default for TuningParameters {
    fn default() -> Self {
        TuningParameters {
            index_offset: INDEX_OFFSET_DEFAULT,
            learning_time_offset_hours: TAU_MEAN_HOURS,
            learning_time_gain_hours: TAU_VARIANCE_HOURS,
            gating_max_duration_minutes: GATING_MAX_DURATION_MINUTES,
            std_initial: SRAW_STD_INITIAL,
            gain_factor: INDEX_GAIN,
        }
    }
}

impl TuningParameters {
    // -- allowed ranges as documented for the SGP4x gas index algorithm
    const INDEX_OFFSET_RANGE: (f32, f32) = (1.0, 250.0);
    const LEARNING_TIME_RANGE: (f32, f32) = (1.0, 1000.0);
    const GATING_MAX_DURATION_RANGE: (f32, f32) = (0.0, 3000.0);
    const STD_INITIAL_RANGE: (f32, f32) = (10.0, 5000.0);
    const GAIN_FACTOR_RANGE: (f32, f32) = (1.0, 1000.0);

    pub fn new(
        index_offset: f32,
        learning_time_offset_hours: f32,
        learning_time_gain_hours: f32,
        gating_max_duration_minutes: f32,
        std_initial: f32,
        gain_factor: f32,
    ) -> TuningParameters {
        TuningParameters {
            index_offset,
            learning_time_offset_hours,
            learning_time_gain_hours,
            gating_max_duration_minutes,
            std_initial,
            gain_factor,
        }
    }

    pub fn validate(&self) -> Result<(), GasIndexError> {
        Self::check("index_offset", self.index_offset, Self::INDEX_OFFSET_RANGE)?;
        Self::check(
            "learning_time_offset_hours",
            self.learning_time_offset_hours,
            Self::LEARNING_TIME_RANGE,
        )?;
        Self::check(
            "learning_time_gain_hours",
            self.learning_time_gain_hours,
            Self::LEARNING_TIME_RANGE,
        )?;
        Self::check(
            "gating_max_duration_minutes",
            self.gating_max_duration_minutes,
            Self::GATING_MAX_DURATION_RANGE,
        )?;
        Self::check("std_initial", self.std_initial, Self::STD_INITIAL_RANGE)?;
        Self::check("gain_factor", self.gain_factor, Self::GAIN_FACTOR_RANGE)?;
        Ok(())
    }

    fn check(name: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), GasIndexError> {
        // -- NaN fails both comparisons and is rejected here too
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(GasIndexError::InvalidTuning { name, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let tuning = TuningParameters::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.index_offset, 100.0);
        assert_eq!(tuning.gain_factor, 230.0);
        assert_eq!(tuning.gating_max_duration_minutes, 180.0);
    }

    #[test]
    fn out_of_range_values_are_named() {
        let tuning = TuningParameters {
            std_initial: 5.0,
            ..TuningParameters::default()
        };
        match tuning.validate() {
            Err(GasIndexError::InvalidTuning { name, value }) => {
                assert_eq!(name, "std_initial");
                assert_eq!(value, 5.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn nan_is_rejected() {
        let tuning = TuningParameters {
            learning_time_gain_hours: f32::NAN,
            ..TuningParameters::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn zero_gating_duration_is_allowed() {
        let tuning = TuningParameters::new(100.0, 12.0, 12.0, 0.0, 50.0, 230.0);
        assert!(tuning.validate().is_ok());
    }
}
