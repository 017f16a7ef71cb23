//! Domain error types.

/// Top-level error type for quantdesk.
#[derive(Debug, thiserror::Error)]
pub enum QuantdeskError {
    #[error("http error: {reason}")]
    Http { reason: String },

    #[error("api error ({status}): {reason}")]
    Api { status: u16, reason: String },

    #[error("not authenticated")]
    Unauthorized,

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

    #[error("experiment spec error: {reason}")]
    ExperimentParse { reason: String },

    #[error("session store error: {reason}")]
    SessionStore { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for QuantdeskError {
    fn from(err: reqwest::Error) -> Self {
        QuantdeskError::Http {
            reason: err.to_string(),
        }
    }
}

impl From<&QuantdeskError> for std::process::ExitCode {
    fn from(err: &QuantdeskError) -> Self {
        let code: u8 = match err {
            QuantdeskError::Io(_) | QuantdeskError::Csv(_) => 1,
            QuantdeskError::ConfigParse { .. }
            | QuantdeskError::ConfigMissing { .. }
            | QuantdeskError::ConfigInvalid { .. } => 2,
            QuantdeskError::Http { .. } | QuantdeskError::Api { .. } => 3,
            QuantdeskError::Unauthorized | QuantdeskError::SessionStore { .. } => 4,
            QuantdeskError::ExperimentParse { .. } => 5,
            QuantdeskError::NoData { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_status() {
        let err = QuantdeskError::Api {
            status: 503,
            reason: "queue unavailable".into(),
        };
        assert_eq!(err.to_string(), "api error (503): queue unavailable");
    }

    #[test]
    fn config_missing_displays_section_and_key() {
        let err = QuantdeskError::ConfigMissing {
            section: "api".into(),
            key: "base_url".into(),
        };
        assert_eq!(err.to_string(), "missing config key [api] base_url");
    }

    #[test]
    fn exit_code_for_config_errors() {
        let err = QuantdeskError::ConfigMissing {
            section: "api".into(),
            key: "base_url".into(),
        };
        let code: std::process::ExitCode = (&err).into();
        assert_eq!(format!("{:?}", code), format!("{:?}", std::process::ExitCode::from(2)));
    }
}
