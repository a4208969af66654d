
// -- see: https://github.com/Sensirion/gas-index-algorithm/blob/master/sensirion_gas_index_algorithm/sensirion_gas_index_algorithm.c

// BSD 3-Clause License

// Copyright (c) 2022, Sensirion AG
// All rights reserved.

// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:

// * Redistributions of source code must retain the above copyright notice, this
//   list of conditions and the following disclaimer.

// * Redistributions in binary form must reproduce the above copyright notice,
//   this list of conditions and the following disclaimer in the documentation
//   and/or other materials provided with the distribution.

// * Neither the name of the copyright holder nor the names of its
//   contributors may be used to endorse or promote products derived from
//   this software without specific prior written permission.

// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Gas index algorithm for SGP4x VOC raw signals.
//!
//! The pipeline per cycle is: mox model -> scaled sigmoid -> adaptive lowpass,
//! with the mean variance estimator learning the baseline from the result.

mod adaptive_lowpass;
mod gas_index_algorithm;
mod mean_variance_estimator;
mod mox_model;
mod sigmoid;
mod tuning;

pub use adaptive_lowpass::LowpassState;
pub use gas_index_algorithm::{AlgorithmState, GasIndexAlgorithm};
pub use mean_variance_estimator::MveState;
pub use mox_model::MoxModel;
pub use sigmoid::{sigmoid, sigmoid_scaled, Sigmoid};
pub use tuning::TuningParameters;

pub const DEFAULT_SAMPLING_INTERVAL: f32 = 1.0;
// -- the sensor is tested from 1 to 10 seconds per sample
pub const MAX_SAMPLING_INTERVAL: f32 = 10.0;
pub const INITIAL_BLACKOUT: f32 = 45.0;
pub const INDEX_GAIN: f32 = 230.0;
pub const SRAW_STD_INITIAL: f32 = 50.0;
pub const SRAW_STD_BONUS: f32 = 220.0;
pub const TAU_MEAN_HOURS: f32 = 12.0;
pub const TAU_VARIANCE_HOURS: f32 = 12.0;
pub const TAU_INITIAL_MEAN: f32 = 20.0;
pub const INIT_DURATION_MEAN: f32 = 3600.0 * 0.75;
pub const INIT_TRANSITION_MEAN: f32 = 0.01;
pub const TAU_INITIAL_VARIANCE: f32 = 2500.0;
pub const INIT_DURATION_VARIANCE: f32 = 3600.0 * 1.45;
pub const INIT_TRANSITION_VARIANCE: f32 = 0.01;
pub const GATING_THRESHOLD: f32 = 340.0;
pub const GATING_THRESHOLD_INITIAL: f32 = 510.0;
pub const GATING_THRESHOLD_TRANSITION: f32 = 0.09;
pub const GATING_MAX_DURATION_MINUTES: f32 = 60.0 * 3.0;
pub const GATING_MAX_RATIO: f32 = 0.3;
pub const SIGMOID_L: f32 = 500.0;
pub const SIGMOID_K: f32 = -0.0065;
pub const SIGMOID_X0: f32 = 213.0;
pub const INDEX_OFFSET_DEFAULT: f32 = 100.0;
pub const LP_TAU_FAST: f32 = 20.0;
pub const LP_TAU_SLOW: f32 = 500.0;
pub const LP_ALPHA: f32 = -0.2;
pub const SRAW_MINIMUM: i32 = 20000;
pub const PERSISTENCE_UPTIME_GAMMA: f32 = 3.0 * 3600.0;
pub const MVE_GAMMA_SCALING: f32 = 64.0;
pub const MVE_ADDITIONAL_GAMMA_MEAN_SCALING: f32 = 8.0;
pub const MVE_FIX16_MAX: f32 = 32767.0;

// -- raw samples at or above this are treated as invalid
pub const SRAW_INVALID_LIMIT: i32 = 65000;
pub const INDEX_MAX: f32 = 500.0;
pub const INDEX_FLOOR: f32 = 0.5;
