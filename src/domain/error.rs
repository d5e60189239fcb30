//! Domain error types.

/// Top-level error type for kabuto.
///
/// Header-resolution and source-open failures are structural and abort the
/// whole operation; the row-level variants (`RowTooShort`, `FieldParse`,
/// `DateParse`) describe a single rejected row and are collected or surfaced
/// depending on the caller's row-error policy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KabutoError {
    #[error("field '{field}' has no header-name mapping")]
    UnmappedField { field: String },

    #[error("header '{header}' for field '{field}' not found in CSV header row")]
    HeaderNotFound { field: String, header: String },

    #[error("row too short: need at least {needed} columns, got {got}")]
    RowTooShort { needed: usize, got: usize },

    #[error("failed to parse field '{field}' from {value:?}")]
    FieldParse { field: String, value: String },

    #[error("failed to parse date field '{field}' from {value:?}")]
    DateParse { field: String, value: String },

    #[error("failed to read CSV source: {reason}")]
    SourceRead { reason: String },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("io error: {reason}")]
    Io { reason: String },
}

impl From<std::io::Error> for KabutoError {
    fn from(err: std::io::Error) -> Self {
        KabutoError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<&KabutoError> for std::process::ExitCode {
    fn from(err: &KabutoError) -> Self {
        let code: u8 = match err {
            KabutoError::Io { .. } => 1,
            KabutoError::ConfigParse { .. }
            | KabutoError::ConfigMissing { .. }
            | KabutoError::InvalidArgument { .. } => 2,
            KabutoError::Store { .. } => 3,
            KabutoError::UnmappedField { .. } | KabutoError::HeaderNotFound { .. } => 4,
            KabutoError::SourceRead { .. } => 5,
            KabutoError::RowTooShort { .. }
            | KabutoError::FieldParse { .. }
            | KabutoError::DateParse { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_and_header() {
        let err = KabutoError::HeaderNotFound {
            field: "open".into(),
            header: "始値".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("open"));
        assert!(msg.contains("始値"));
    }

    #[test]
    fn display_quotes_raw_value() {
        let err = KabutoError::FieldParse {
            field: "close".into(),
            value: "not a number".into(),
        };
        assert!(err.to_string().contains("\"not a number\""));
    }

    #[test]
    fn io_error_converts() {
        let err: KabutoError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, KabutoError::Io { .. }));
    }
}
