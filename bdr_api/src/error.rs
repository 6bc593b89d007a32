pub type Result<T> = std::result::Result<T, BdrApiError>;

#[derive(Debug, thiserror::Error)]
pub enum BdrApiError {
    #[error("request to storage api failed")]
    Request(#[from] reqwest::Error),

    #[error("storage api returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to build rights payload")]
    Rights(#[from] rights::Error),
}

impl BdrApiError {
    /// True when the storage API could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            BdrApiError::Request(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
