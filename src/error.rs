use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

/// Failures the simulation can report. Everything else (stale bodies,
/// out-of-range impulses) is absorbed silently.
#[derive(Error, Debug)]
pub enum SimError {
    /// A surface or tuning value that would leave the simulation half-built.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("could not read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] ron::Error),
}

impl SimError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(msg.into())
    }
}
