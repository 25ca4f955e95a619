//! Domain error types.

/// Top-level error type for lowvol.
#[derive(Debug, thiserror::Error)]
pub enum LowvolError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {observations} prices, need {minimum}")]
    InsufficientData {
        symbol: String,
        observations: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LowvolError> for std::process::ExitCode {
    fn from(err: &LowvolError) -> Self {
        let code: u8 = match err {
            LowvolError::Io(_) => 1,
            LowvolError::ConfigParse { .. }
            | LowvolError::ConfigMissing { .. }
            | LowvolError::ConfigInvalid { .. } => 2,
            LowvolError::Data { .. } => 3,
            LowvolError::InvalidState { .. } => 4,
            LowvolError::NoData { .. } | LowvolError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
