use rehearsal_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("roster decode error: {0}")]
    Decode(#[from] CoreError),

    #[error("snapshot read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL snapshots need the `http` feature: {0}")]
    UrlUnsupported(String),

    #[error("roster unavailable (live: {live}; fallback: {fallback})")]
    Unavailable { live: String, fallback: String },
}
