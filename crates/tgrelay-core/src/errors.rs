/// Core error type for the relay.
///
/// Adapter crates map their specific errors into this type so the worker can
/// decide between retrying (transient) and dropping (everything else).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transient error: {0}")]
    Transient(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Timeouts and network-level failures; worth another attempt later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
