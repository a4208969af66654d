use chrono::{DateTime, TimeDelta, Utc};
#[allow(unused_imports)]
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::algorithm::{GasIndexAlgorithm, TuningParameters};
use crate::errors::GasIndexError;

// -- a learned baseline is only trusted after short interruptions
pub const MAX_RESUME_GAP_MINUTES: i64 = 10;

/// Learned baseline of a gas index algorithm, persisted as JSON so a restart
/// can skip the initial learning phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub mean: f32,
    pub std: f32,
    pub sampling_interval: f32,
    pub tuning: TuningParameters,
    pub saved_at: DateTime<Utc>,
}

impl StateSnapshot {
    /// `None` until the algorithm has seen its first valid sample.
    pub fn capture(algorithm: &GasIndexAlgorithm, now: DateTime<Utc>) -> Option<StateSnapshot> {
        if !algorithm.state().mve.initialized {
            return None;
        }
        let (mean, std) = algorithm.states();
        Some(StateSnapshot {
            mean,
            std,
            sampling_interval: algorithm.sampling_interval(),
            tuning: algorithm.tuning_parameters(),
            saved_at: now,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), GasIndexError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved gas index state to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<StateSnapshot, GasIndexError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn max_resume_gap() -> TimeDelta {
        TimeDelta::minutes(MAX_RESUME_GAP_MINUTES)
    }

    /// Whether the snapshot was taken at most `max_gap` before `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_gap: TimeDelta) -> bool {
        let age = now - self.saved_at;
        age >= TimeDelta::zero() && age <= max_gap
    }

    /// Seeds `algorithm` with this snapshot if it is fresh and was taken with
    /// the same sampling interval and tuning. Returns whether it resumed.
    pub fn restore_into(
        &self,
        algorithm: &mut GasIndexAlgorithm,
        now: DateTime<Utc>,
    ) -> Result<bool, GasIndexError> {
        if self.sampling_interval != algorithm.sampling_interval() {
            warn!(
                "Ignoring saved state: sampling interval {}s differs from {}s",
                self.sampling_interval,
                algorithm.sampling_interval()
            );
            return Ok(false);
        }
        if self.tuning != algorithm.tuning_parameters() {
            warn!("Ignoring saved state: learned with different tuning {:?}", self.tuning);
            return Ok(false);
        }
        if !self.is_fresh(now, Self::max_resume_gap()) {
            warn!(
                "Ignoring saved state from {}: older than {MAX_RESUME_GAP_MINUTES} minutes",
                self.saved_at
            );
            return Ok(false);
        }
        algorithm.set_states(self.mean, self.std)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(saved_at: DateTime<Utc>) -> StateSnapshot {
        StateSnapshot {
            mean: 10_000.0,
            std: 60.0,
            sampling_interval: 1.0,
            tuning: TuningParameters::default(),
            saved_at,
        }
    }

    #[test]
    fn freshness_window() {
        let now = Utc::now();
        let gap = StateSnapshot::max_resume_gap();
        assert!(snapshot(now).is_fresh(now, gap));
        assert!(snapshot(now - TimeDelta::minutes(9)).is_fresh(now, gap));
        assert!(!snapshot(now - TimeDelta::minutes(11)).is_fresh(now, gap));
        // -- clock went backwards
        assert!(!snapshot(now + TimeDelta::minutes(1)).is_fresh(now, gap));
    }

    #[test]
    fn freshness_window_is_caller_defined() {
        let now = Utc::now();
        let old = snapshot(now - TimeDelta::minutes(30));
        assert!(!old.is_fresh(now, StateSnapshot::max_resume_gap()));
        assert!(old.is_fresh(now, TimeDelta::hours(1)));
        assert!(!snapshot(now - TimeDelta::seconds(1)).is_fresh(now, TimeDelta::zero()));
    }

    #[test]
    fn capture_requires_initialized_baseline() {
        let algorithm = GasIndexAlgorithm::new();
        assert!(StateSnapshot::capture(&algorithm, Utc::now()).is_none());
    }

    #[test]
    fn stale_snapshot_is_not_restored() {
        let now = Utc::now();
        let mut algorithm = GasIndexAlgorithm::new();
        let resumed = snapshot(now - TimeDelta::hours(2))
            .restore_into(&mut algorithm, now)
            .unwrap();
        assert!(!resumed);
        assert!(!algorithm.state().mve.initialized);
    }

    #[test]
    fn mismatched_sampling_interval_is_not_restored() {
        let now = Utc::now();
        let mut algorithm = GasIndexAlgorithm::with_sampling_interval(3.0).unwrap();
        assert!(!snapshot(now).restore_into(&mut algorithm, now).unwrap());
    }

    #[test]
    fn fresh_snapshot_is_restored() {
        let now = Utc::now();
        let mut algorithm = GasIndexAlgorithm::new();
        assert!(snapshot(now).restore_into(&mut algorithm, now).unwrap());
        assert_eq!(algorithm.states(), (10_000.0, 60.0));
    }

    #[test]
    fn invalid_snapshot_values_are_errors() {
        let now = Utc::now();
        let mut algorithm = GasIndexAlgorithm::new();
        let broken = StateSnapshot {
            std: 0.0,
            ..snapshot(now)
        };
        assert!(broken.restore_into(&mut algorithm, now).is_err());
    }
}
