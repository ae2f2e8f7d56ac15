//! Domain error types.

/// Top-level error type for trendwatch.
#[derive(Debug, thiserror::Error)]
pub enum TrendwatchError {
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

    #[error(transparent)]
    Watchlist(#[from] crate::domain::watchlist::WatchlistError),

    #[error("failed to fetch bars for {symbol}: {reason}")]
    DataFetch { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {required}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        required: usize,
    },

    #[error("exchange error: {reason}")]
    Exchange { reason: String },

    #[error("notification error: {reason}")]
    Notify { reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendwatchError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrendwatchError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        TrendwatchError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&TrendwatchError> for std::process::ExitCode {
    fn from(err: &TrendwatchError) -> Self {
        let code: u8 = match err {
            TrendwatchError::Io(_) => 1,
            TrendwatchError::ConfigParse { .. }
            | TrendwatchError::ConfigMissing { .. }
            | TrendwatchError::ConfigInvalid { .. }
            | TrendwatchError::Watchlist(_) => 2,
            TrendwatchError::DataFetch { .. }
            | TrendwatchError::InsufficientData { .. }
            | TrendwatchError::Http(_) => 3,
            TrendwatchError::Exchange { .. } => 4,
            TrendwatchError::Notify { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
