use thiserror::Error;

#[derive(Debug, Error)]
pub enum GasIndexError {
    #[error("sampling interval must be within (0, 10] seconds, got {0}")]
    InvalidSamplingInterval(f32),

    #[error("tuning parameter {name} out of range: {value}")]
    InvalidTuning { name: &'static str, value: f32 },

    #[error("invalid algorithm state: mean {mean}, std {std}")]
    InvalidState { mean: f32, std: f32 },

    #[error("cannot parse raw sample on line {line}: {content:?}")]
    ParseSample { line: usize, content: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state snapshot error: {0}")]
    Json(#[from] serde_json::Error),
}
