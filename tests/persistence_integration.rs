use chrono::{TimeDelta, Utc};
use gas_index::persistence::StateSnapshot;
use gas_index::{GasIndexAlgorithm, GasIndexError};

fn learned_algorithm() -> GasIndexAlgorithm {
    let mut algorithm = GasIndexAlgorithm::new();
    for _ in 0..(46 + 900) {
        algorithm.process(30_000);
    }
    algorithm
}

#[test]
fn snapshot_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gas_index_state.json");

    let algorithm = learned_algorithm();
    let snapshot = StateSnapshot::capture(&algorithm, Utc::now()).unwrap();
    snapshot.save(&path).unwrap();

    let loaded = StateSnapshot::load(&path).unwrap();
    assert_eq!(loaded, snapshot);
    assert_eq!((loaded.mean, loaded.std), algorithm.states());
}

#[test]
fn restored_algorithm_starts_on_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let now = Utc::now();
    StateSnapshot::capture(&learned_algorithm(), now)
        .unwrap()
        .save(&path)
        .unwrap();

    let mut restarted = GasIndexAlgorithm::new();
    let resumed = StateSnapshot::load(&path)
        .unwrap()
        .restore_into(&mut restarted, now + TimeDelta::minutes(3))
        .unwrap();
    assert!(resumed);

    for _ in 0..46 {
        assert_eq!(restarted.process(30_000), 0);
    }
    let index = restarted.process(30_000);
    assert!(index.abs_diff(100) <= 2, "index {index}");
}

#[test]
fn missing_and_corrupt_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = StateSnapshot::load(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(GasIndexError::Io(_))));

    let corrupt_path = dir.path().join("corrupt.json");
    std::fs::write(&corrupt_path, "{ \"mean\": ").unwrap();
    let corrupt = StateSnapshot::load(&corrupt_path);
    assert!(matches!(corrupt, Err(GasIndexError::Json(_))));
}
