#[allow(unused_imports)]
use log::{debug, trace};

use super::sigmoid::Sigmoid;
use super::tuning::TuningParameters;
use super::{
    GATING_MAX_RATIO, GATING_THRESHOLD, GATING_THRESHOLD_INITIAL, GATING_THRESHOLD_TRANSITION,
    INIT_DURATION_MEAN, INIT_DURATION_VARIANCE, INIT_TRANSITION_MEAN, INIT_TRANSITION_VARIANCE,
    MVE_ADDITIONAL_GAMMA_MEAN_SCALING, MVE_FIX16_MAX, MVE_GAMMA_SCALING, TAU_INITIAL_MEAN,
    TAU_INITIAL_VARIANCE,
};

// -- the mean is folded into the offset once it drifts this far
const MEAN_RECENTER_LIMIT: f32 = 100.0;
// -- above this the variance update is rescaled to stay in range
const STD_ADDITIONAL_SCALING_LIMIT: f32 = 1440.0;
const STD_ADDITIONAL_SCALING: f32 = 4.0;

/// Online baseline (mean, std) tracker of the raw signal.
///
/// Learning rates ("gammas") start fast and settle over the first hours of
/// uptime. Learning is gated off while the gas index sits well above the
/// gating threshold, i.e. during a VOC event, and entirely while the caller
/// is not calibrating.
#[derive(Clone, Debug, PartialEq)]
pub struct MveState {
    pub initialized: bool,
    pub mean: f32,
    pub sraw_offset: f32,
    pub std: f32,
    // -- steady-state and initial learning rates, derived from tuning
    pub gamma_mean: f32,
    pub gamma_variance: f32,
    pub gamma_initial_mean: f32,
    pub gamma_initial_variance: f32,
    // -- learning rates of the current cycle after warm-up blend and gating
    pub gated_gamma_mean: f32,
    pub gated_gamma_variance: f32,
    pub uptime_gamma: f32,
    pub uptime_gating: f32,
    pub gating_duration_minutes: f32,
    sampling_interval: f32,
    gating_max_duration_minutes: f32,
}

impl MveState {
    pub fn new(tuning: &TuningParameters, sampling_interval: f32) -> MveState {
        let interval_hours = sampling_interval / 3600.0;
        MveState {
            initialized: false,
            mean: 0.0,
            sraw_offset: 0.0,
            std: tuning.std_initial,
            gamma_mean: ((MVE_ADDITIONAL_GAMMA_MEAN_SCALING * MVE_GAMMA_SCALING) * interval_hours)
                / (tuning.learning_time_offset_hours + interval_hours),
            gamma_variance: (MVE_GAMMA_SCALING * interval_hours)
                / (tuning.learning_time_gain_hours + interval_hours),
            gamma_initial_mean: ((MVE_ADDITIONAL_GAMMA_MEAN_SCALING * MVE_GAMMA_SCALING)
                * sampling_interval)
                / (TAU_INITIAL_MEAN + sampling_interval),
            gamma_initial_variance: (MVE_GAMMA_SCALING * sampling_interval)
                / (TAU_INITIAL_VARIANCE + sampling_interval),
            gated_gamma_mean: 0.0,
            gated_gamma_variance: 0.0,
            uptime_gamma: 0.0,
            uptime_gating: 0.0,
            gating_duration_minutes: 0.0,
            sampling_interval,
            gating_max_duration_minutes: tuning.gating_max_duration_minutes,
        }
    }

    pub fn mean(&self) -> f32 {
        self.mean + self.sraw_offset
    }

    pub fn std(&self) -> f32 {
        self.std
    }

    pub fn gating_max_duration_minutes(&self) -> f32 {
        self.gating_max_duration_minutes
    }

    /// Seeds the estimator with previously learned values.
    pub fn set_states(&mut self, mean: f32, std: f32, uptime_gamma: f32) {
        self.sraw_offset = mean;
        self.mean = 0.0;
        self.std = std;
        self.uptime_gamma = uptime_gamma;
        self.initialized = true;
    }

    pub fn process(&mut self, sraw: f32, gas_index: f32, calibrating: bool) {
        if !self.initialized {
            self.initialized = true;
            self.sraw_offset = sraw;
            self.mean = 0.0;
            debug!("Mean variance estimator initialized at sraw {sraw}");
            return;
        }

        if self.mean >= MEAN_RECENTER_LIMIT || self.mean <= -MEAN_RECENTER_LIMIT {
            trace!("Re-centering sraw offset {} by {}", self.sraw_offset, self.mean);
            self.sraw_offset += self.mean;
            self.mean = 0.0;
        }
        let sraw = sraw - self.sraw_offset;

        self.calculate_gamma(gas_index, calibrating);

        let delta_sgp = (sraw - self.mean) / MVE_GAMMA_SCALING;
        let c = if delta_sgp < 0.0 {
            self.std - delta_sgp
        } else {
            self.std + delta_sgp
        };
        let additional_scaling = if c > STD_ADDITIONAL_SCALING_LIMIT {
            STD_ADDITIONAL_SCALING
        } else {
            1.0
        };

        let sqrt_a = (additional_scaling * (MVE_GAMMA_SCALING - self.gated_gamma_variance)).sqrt();
        let sqrt_b = ((self.std * (self.std / (MVE_GAMMA_SCALING * additional_scaling)))
            + (((self.gated_gamma_variance * delta_sgp) / additional_scaling) * delta_sgp))
            .sqrt();
        self.std = sqrt_a * sqrt_b;
        self.mean += (self.gated_gamma_mean * delta_sgp) / MVE_ADDITIONAL_GAMMA_MEAN_SCALING;
    }

    fn calculate_gamma(&mut self, gas_index: f32, calibrating: bool) {
        // -- timers saturate instead of growing without bound
        let uptime_limit = MVE_FIX16_MAX - self.sampling_interval;
        if self.uptime_gamma < uptime_limit {
            self.uptime_gamma += self.sampling_interval;
        }
        if self.uptime_gating < uptime_limit {
            self.uptime_gating += self.sampling_interval;
        }

        let warm_up_mean = Sigmoid::unit(INIT_DURATION_MEAN, INIT_TRANSITION_MEAN);
        let sigmoid_gamma_mean = warm_up_mean.gate(self.uptime_gamma, calibrating);
        let gamma_mean =
            self.gamma_mean + ((self.gamma_initial_mean - self.gamma_mean) * sigmoid_gamma_mean);
        let gating_threshold_mean = GATING_THRESHOLD
            + ((GATING_THRESHOLD_INITIAL - GATING_THRESHOLD)
                * warm_up_mean.gate(self.uptime_gating, calibrating));
        let sigmoid_gating_mean = Sigmoid::unit(gating_threshold_mean, GATING_THRESHOLD_TRANSITION)
            .gate(gas_index, calibrating);
        self.gated_gamma_mean = sigmoid_gating_mean * gamma_mean;

        let warm_up_variance = Sigmoid::unit(INIT_DURATION_VARIANCE, INIT_TRANSITION_VARIANCE);
        let sigmoid_gamma_variance = warm_up_variance.gate(self.uptime_gamma, calibrating);
        let gamma_variance = self.gamma_variance
            + ((self.gamma_initial_variance - self.gamma_variance)
                * (sigmoid_gamma_variance - sigmoid_gamma_mean));
        let gating_threshold_variance = GATING_THRESHOLD
            + ((GATING_THRESHOLD_INITIAL - GATING_THRESHOLD)
                * warm_up_variance.gate(self.uptime_gating, calibrating));
        let sigmoid_gating_variance =
            Sigmoid::unit(gating_threshold_variance, GATING_THRESHOLD_TRANSITION)
                .gate(gas_index, calibrating);
        self.gated_gamma_variance = sigmoid_gating_variance * gamma_variance;

        self.gating_duration_minutes += (self.sampling_interval / 60.0)
            * (((1.0 - sigmoid_gating_mean) * (1.0 + GATING_MAX_RATIO)) - GATING_MAX_RATIO);
        if self.gating_duration_minutes < 0.0 {
            self.gating_duration_minutes = 0.0;
        }
        if self.gating_duration_minutes > self.gating_max_duration_minutes {
            // -- re-arm the elevated initial threshold so gating cannot stick
            debug!(
                "Gated for {:.1} minutes, re-arming initial gating threshold",
                self.gating_duration_minutes
            );
            self.gating_duration_minutes = self.gating_max_duration_minutes;
            self.uptime_gating = 0.0;
        }
    }
}
