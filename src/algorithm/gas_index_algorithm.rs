#[allow(unused_imports)]
use log::{debug, info, trace};

use super::adaptive_lowpass::LowpassState;
use super::mean_variance_estimator::MveState;
use super::mox_model::MoxModel;
use super::sigmoid::sigmoid_scaled;
use super::tuning::TuningParameters;
use super::{
    DEFAULT_SAMPLING_INTERVAL, INDEX_FLOOR, INDEX_MAX, INITIAL_BLACKOUT, MAX_SAMPLING_INTERVAL,
    PERSISTENCE_UPTIME_GAMMA, SRAW_INVALID_LIMIT, SRAW_MINIMUM,
};
use crate::errors::GasIndexError;

/// Mutable state of one gas index algorithm instance.
#[derive(Clone, Debug, PartialEq)]
pub struct AlgorithmState {
    /// Seconds counted during the initial blackout.
    pub uptime: f32,
    /// Offset-corrected raw value of the last valid sample.
    pub sraw: f32,
    /// Index before rounding.
    pub gas_index: f32,
    /// While false the baseline estimator does not learn.
    pub calibrating: bool,
    pub mve: MveState,
    pub mox: MoxModel,
    pub lowpass: LowpassState,
}

impl AlgorithmState {
    fn new(tuning: &TuningParameters, sampling_interval: f32, calibrating: bool) -> AlgorithmState {
        let mve = MveState::new(tuning, sampling_interval);
        let mox = MoxModel::new(mve.std(), mve.mean(), tuning.gain_factor);
        AlgorithmState {
            uptime: 0.0,
            sraw: 0.0,
            gas_index: 0.0,
            calibrating,
            mve,
            mox,
            lowpass: LowpassState::new(sampling_interval),
        }
    }
}

/// Converts SGP4x VOC raw signals into a gas index in `[0, 500]`.
///
/// `process` must be called once per `sampling_interval`; the algorithm
/// counts calls, not wall-clock time.
#[derive(Clone, Debug)]
pub struct GasIndexAlgorithm {
    sampling_interval: f32,
    tuning: TuningParameters,
    state: AlgorithmState,
}

impl Default for GasIndexAlgorithm {
    fn default() -> Self {
        GasIndexAlgorithm::new()
    }
}

impl GasIndexAlgorithm {
    /// Algorithm with a 1 second sampling interval and default tuning.
    pub fn new() -> GasIndexAlgorithm {
        let tuning = TuningParameters::default();
        GasIndexAlgorithm {
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
            tuning,
            state: AlgorithmState::new(&tuning, DEFAULT_SAMPLING_INTERVAL, true),
        }
    }

    pub fn with_sampling_interval(sampling_interval: f32) -> Result<GasIndexAlgorithm, GasIndexError> {
        Self::with_tuning(sampling_interval, TuningParameters::default())
    }

    pub fn with_tuning(
        sampling_interval: f32,
        tuning: TuningParameters,
    ) -> Result<GasIndexAlgorithm, GasIndexError> {
        // -- NaN fails the comparison as well
        if !(sampling_interval > 0.0 && sampling_interval <= MAX_SAMPLING_INTERVAL) {
            return Err(GasIndexError::InvalidSamplingInterval(sampling_interval));
        }
        tuning.validate()?;
        debug!("Creating gas index algorithm, sampling interval {sampling_interval}s, {tuning:?}");
        Ok(GasIndexAlgorithm {
            sampling_interval,
            tuning,
            state: AlgorithmState::new(&tuning, sampling_interval, true),
        })
    }

    pub fn sampling_interval(&self) -> f32 {
        self.sampling_interval
    }

    pub fn tuning_parameters(&self) -> TuningParameters {
        self.tuning
    }

    pub fn state(&self) -> &AlgorithmState {
        &self.state
    }

    pub fn is_calibrating(&self) -> bool {
        self.state.calibrating
    }

    /// Pauses (`false`) or resumes (`true`) baseline learning, e.g. while a
    /// heater is known to push the air off baseline.
    pub fn set_calibrating(&mut self, calibrating: bool) {
        self.state.calibrating = calibrating;
    }

    pub fn is_blackout(&self) -> bool {
        self.state.uptime <= INITIAL_BLACKOUT
    }

    /// Restarts with the initial blackout and learning phase. Tuning and the
    /// calibrating flag are kept.
    pub fn reset(&mut self) {
        debug!("Resetting gas index algorithm");
        self.state = AlgorithmState::new(&self.tuning, self.sampling_interval, self.state.calibrating);
    }

    /// Replaces the tuning and resets the algorithm. Invalid tuning leaves
    /// the algorithm untouched.
    pub fn set_tuning_parameters(&mut self, tuning: TuningParameters) -> Result<(), GasIndexError> {
        tuning.validate()?;
        debug!("Setting tuning parameters {tuning:?}");
        self.tuning = tuning;
        self.reset();
        Ok(())
    }

    /// Current baseline `(mean, std)`, for resuming via `set_states`.
    pub fn states(&self) -> (f32, f32) {
        (self.state.mve.mean(), self.state.mve.std())
    }

    /// Seeds the baseline from `states()` of an earlier run and skips the
    /// initial learning phase. Only meant for interruptions of less than
    /// ten minutes; call it right after construction, `reset()` or
    /// `set_tuning_parameters()`.
    pub fn set_states(&mut self, mean: f32, std: f32) -> Result<(), GasIndexError> {
        if !(mean.is_finite() && std.is_finite() && std > 0.0) {
            return Err(GasIndexError::InvalidState { mean, std });
        }
        info!("Resuming gas index baseline: mean {mean}, std {std}");
        let state = &mut self.state;
        state.mve.set_states(mean, std, PERSISTENCE_UPTIME_GAMMA);
        state.mox.set_parameters(state.mve.std(), state.mve.mean());
        state.sraw = mean;
        Ok(())
    }

    /// Processes one raw sample and returns the gas index.
    ///
    /// Returns 0 during the initial blackout and 1..=500 afterwards. Samples
    /// outside `1..65000` are ignored; the previous valid value is reused.
    pub fn process(&mut self, raw: i32) -> u16 {
        let state = &mut self.state;
        if state.uptime <= INITIAL_BLACKOUT {
            state.uptime += self.sampling_interval;
            trace!("Blackout, uptime {}s", state.uptime);
            return 0;
        }

        if raw > 0 && raw < SRAW_INVALID_LIMIT {
            let raw = raw.clamp(SRAW_MINIMUM + 1, SRAW_MINIMUM + i32::from(i16::MAX));
            state.sraw = (raw - SRAW_MINIMUM) as f32;
        }

        let unscaled = state.mox.process(state.sraw);
        let scaled = sigmoid_scaled(unscaled, self.tuning.index_offset);
        state.gas_index = state.lowpass.process(scaled).clamp(INDEX_FLOOR, INDEX_MAX);

        if state.sraw > 0.0 {
            state.mve.process(state.sraw, state.gas_index, state.calibrating);
            state.mox.set_parameters(state.mve.std(), state.mve.mean());
        }
        trace!(
            "raw {raw}, sraw {}, gas index {:.3}, mean {:.3}, std {:.3}",
            state.sraw,
            state.gas_index,
            state.mve.mean(),
            state.mve.std()
        );

        // -- f32::round rounds half away from zero
        state.gas_index.round() as u16
    }
}
