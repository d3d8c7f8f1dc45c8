use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown market code: {0}")]
    UnknownMarket(String),

    #[error("unknown gender filter: {0}")]
    UnknownGender(String),

    #[error("invalid age range: {min}-{max}")]
    InvalidAgeRange { min: u8, max: u8 },

    #[error("malformed age range: {0}")]
    MalformedAgeRange(String),

    #[error("roster JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
