//! Error types for the scanpol engine and CLI

use thiserror::Error;

/// Result type alias for scanpol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Policy document parse errors.
///
/// A document that fails to parse is treated by the query API as "no policy
/// configured" rather than a hard failure; this type exists for callers that
/// need to report the reason (the CLI, pre-commit checks).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Policy document is not valid YAML: {0}")]
    Yaml(String),

    #[error("Policy document must be a YAML mapping at the top level")]
    NotAMapping,
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        ParseError::Yaml(err.to_string())
    }
}

/// Schema registry packaging errors.
///
/// These indicate a broken build (a version listed without a vendored schema
/// file, or a vendored schema that does not compile), not bad user input.
/// Checked once at startup, never per validation call.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no vendored schema for {report_type} version {version}")]
    MissingSchema {
        report_type: String,
        version: String,
    },

    #[error("vendored schema for {report_type} version {version} is invalid: {message}")]
    InvalidSchema {
        report_type: String,
        version: String,
        message: String,
    },

    #[error("policy document schema is invalid: {0}")]
    InvalidPolicySchema(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_from_yaml_error() {
        let yaml_str = "cadence: * 1 2 3";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let parse_err: ParseError = yaml_err.into();

        match parse_err {
            ParseError::Yaml(_) => (),
            _ => panic!("Expected ParseError::Yaml"),
        }
    }

    #[test]
    fn test_parse_error_not_a_mapping_message() {
        let err = ParseError::NotAMapping;
        assert!(err.to_string().contains("YAML mapping"));
    }

    #[test]
    fn test_registry_error_missing_schema() {
        let err = RegistryError::MissingSchema {
            report_type: "dast".to_string(),
            version: "99.0.0".to_string(),
        };
        assert!(err.to_string().contains("dast"));
        assert!(err.to_string().contains("99.0.0"));
    }

    #[test]
    fn test_error_from_parse_error() {
        let parse_err = ParseError::NotAMapping;
        let err: Error = parse_err.into();

        match err {
            Error::Parse(ParseError::NotAMapping) => (),
            _ => panic!("Expected Error::Parse(ParseError::NotAMapping)"),
        }
    }

    #[test]
    fn test_error_other() {
        let err = Error::Other("Custom error".to_string());
        assert!(err.to_string().contains("Custom error"));
    }
}
