use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug)]
pub enum StatsError {
    /// A retrieval failed, timed out or returned a malformed payload.
    #[error("Dati non disponibili: {0}")]
    DataUnavailable(String),

    /// Rejected at load time, never mid-refresh.
    #[error("Configurazione non valida: {0}")]
    Configuration(String),
}

impl StatsError {
    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        StatsError::DataUnavailable(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        StatsError::Configuration(msg.into())
    }
}
