//! Report schema validation
//!
//! Validates a parsed security report against a vendored JSON Schema,
//! resolving the declared version to the best available schema. Malformed
//! input never raises: every failure mode lands in the returned
//! [`ValidationResult`]. The one exception — a version listed without a
//! vendored schema — is a packaging invariant checked by
//! [`registry::verify`] at startup.

pub mod registry;
pub mod version;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde::Serialize;

pub use registry::ReportType;
pub use version::SchemaVersion;

/// Outcome of validating a single report document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub deprecation_warnings: Vec<String>,
}

impl ValidationResult {
    /// A result carrying only collected errors; `valid` is their conjunction.
    pub(crate) fn from_errors(errors: Vec<String>) -> Self {
        ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
            deprecation_warnings: Vec::new(),
        }
    }
}

/// Caller-supplied identifiers attached to validation problem logs.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub project_id: Option<i64>,
    pub scanner_id: Option<String>,
    pub scanner_version: Option<String>,
}

/// Failure kinds recorded when a report does not validate cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFailure {
    SchemaValidationFails,
    UsingDeprecatedSchemaVersion,
    UsingUnsupportedSchemaVersion,
}

impl ReportFailure {
    fn as_str(&self) -> &'static str {
        match self {
            ReportFailure::SchemaValidationFails => "schema_validation_fails",
            ReportFailure::UsingDeprecatedSchemaVersion => "using_deprecated_schema_version",
            ReportFailure::UsingUnsupportedSchemaVersion => "using_unsupported_schema_version",
        }
    }
}

/// Validate a report document of the given type against its declared schema
/// version.
///
/// Version resolution, in priority order:
///
/// 1. no declared version — validate against the earliest supported schema
///    so structural errors still surface, but the result is never valid;
/// 2. exact deprecated match — validate against the retired schema and
///    attach a deprecation warning; validity reflects schema conformance;
/// 3. exact supported match — validate normally;
/// 4. supported MAJOR.MINOR with an unknown PATCH — validate against the
///    latest supported version sharing MAJOR.MINOR, with a warning;
/// 5. anything else — validate against the earliest supported schema; the
///    result is never valid, even when the document satisfies it.
///
/// Deprecation is an exact-version annotation and is checked before PATCH
/// substitution.
pub fn validate_report(
    report_type: ReportType,
    document: &serde_json::Value,
    declared_version: Option<&str>,
    context: &ValidationContext,
) -> ValidationResult {
    let supported = registry::supported_versions(report_type);
    let deprecated = registry::deprecated_versions(report_type);
    let supported_list = supported.join(", ");
    let earliest = supported[0];

    let mut result = ValidationResult::default();
    let mut force_invalid = false;
    let mut resolved = earliest;

    match declared_version {
        None => {
            result.errors.push(format!(
                "Report version not provided, {report_type} report type supports versions: \
                 {supported_list}. Validation will be attempted against the earliest supported \
                 version of this report type, to show all the errors but the report will not \
                 be ingested"
            ));
            force_invalid = true;
        }
        Some(declared) if deprecated.contains(&declared) => {
            result.deprecation_warnings.push(format!(
                "Version {declared} for report type {report_type} has been deprecated, \
                 supported versions for this report type are: {supported_list}. The report \
                 will be parsed and ingested if valid."
            ));
            log_validation_problem(
                report_type,
                Some(declared),
                context,
                ReportFailure::UsingDeprecatedSchemaVersion,
            );
            // Retired versions keep their vendored schema; a deprecated
            // version with no schema on record falls back to the earliest.
            if registry::validator_for(report_type, declared).is_some() {
                resolved = deprecated
                    .iter()
                    .find(|v| **v == declared)
                    .copied()
                    .unwrap_or(earliest);
            }
        }
        Some(declared) if supported.contains(&declared) => {
            resolved = supported
                .iter()
                .find(|v| **v == declared)
                .copied()
                .unwrap_or(earliest);
        }
        Some(declared) => {
            let supported_parsed: Vec<SchemaVersion> = supported
                .iter()
                .filter_map(|v| v.parse().ok())
                .collect();
            let substitute = declared
                .parse::<SchemaVersion>()
                .ok()
                .and_then(|parsed| version::latest_patch_match(&parsed, &supported_parsed));

            match substitute {
                Some(chosen) => {
                    result.warnings.push(format!(
                        "This report uses a supported MAJOR.MINOR schema version but the PATCH \
                         version doesn't match any vendored schema version. Validation will be \
                         attempted against version {chosen}"
                    ));
                    let chosen = chosen.to_string();
                    resolved = supported
                        .iter()
                        .find(|v| **v == chosen)
                        .copied()
                        .unwrap_or(earliest);
                }
                None => {
                    result.errors.push(format!(
                        "Version {declared} for report type {report_type} is unsupported, \
                         supported versions for this report type are: {supported_list}. \
                         Validation will be attempted against the earliest supported version \
                         of this report type, to show all the errors but the report will not \
                         be ingested"
                    ));
                    log_validation_problem(
                        report_type,
                        Some(declared),
                        context,
                        ReportFailure::UsingUnsupportedSchemaVersion,
                    );
                    force_invalid = true;
                }
            }
        }
    }

    let schema_errors = match registry::validator_for(report_type, resolved) {
        Some(validator) => format_schema_errors(validator, document),
        None => vec![format!(
            "no vendored schema available for {report_type} version {resolved}"
        )],
    };

    if !schema_errors.is_empty() {
        log_validation_problem(
            report_type,
            declared_version,
            context,
            ReportFailure::SchemaValidationFails,
        );
    }

    result.valid = schema_errors.is_empty() && !force_invalid;
    result.errors.extend(schema_errors);
    result
}

fn log_validation_problem(
    report_type: ReportType,
    declared_version: Option<&str>,
    context: &ValidationContext,
    failure: ReportFailure,
) {
    log::info!(
        "security report schema validation problem: report_type={} report_version={} \
         project_id={} failure={} scanner_id={} scanner_version={}",
        report_type,
        declared_version.unwrap_or("none"),
        context
            .project_id
            .map_or_else(|| "none".to_string(), |id| id.to_string()),
        failure.as_str(),
        context.scanner_id.as_deref().unwrap_or("none"),
        context.scanner_version.as_deref().unwrap_or("none"),
    );
}

fn subject(path: &str) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        format!("property '{path}'")
    }
}

fn error_type_label(kind: &ValidationErrorKind) -> Option<&'static str> {
    match kind {
        ValidationErrorKind::MaxProperties { .. } => Some("maxProperties"),
        ValidationErrorKind::MinProperties { .. } => Some("minProperties"),
        ValidationErrorKind::AdditionalProperties { .. } => Some("additionalProperties"),
        ValidationErrorKind::UnevaluatedProperties { .. } => Some("unevaluatedProperties"),
        ValidationErrorKind::Enum { .. } => Some("enum"),
        ValidationErrorKind::MaxLength { .. } => Some("maxLength"),
        ValidationErrorKind::MinLength { .. } => Some("minLength"),
        ValidationErrorKind::Minimum { .. } => Some("minimum"),
        ValidationErrorKind::Maximum { .. } => Some("maximum"),
        ValidationErrorKind::MinItems { .. } => Some("minItems"),
        ValidationErrorKind::MaxItems { .. } => Some("maxItems"),
        ValidationErrorKind::Format { .. } => Some("format"),
        _ => None,
    }
}

/// Render schema violations as pointer-qualified, human-readable strings.
/// Missing required keys are grouped per instance path into one message.
pub(crate) fn format_schema_errors(
    validator: &jsonschema::Validator,
    document: &serde_json::Value,
) -> Vec<String> {
    let mut missing_keys: Vec<(String, Vec<String>)> = Vec::new();
    let mut messages = Vec::new();

    for error in validator.iter_errors(document) {
        let path = error.instance_path.to_string();
        match &error.kind {
            ValidationErrorKind::Required { property } => {
                let key = property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_string);
                match missing_keys.iter_mut().find(|(p, _)| *p == path) {
                    Some((_, keys)) => keys.push(key),
                    None => missing_keys.push((path, vec![key])),
                }
            }
            ValidationErrorKind::Pattern { pattern } => {
                messages.push(format!(
                    "{} does not match pattern: {pattern}",
                    subject(&path)
                ));
            }
            ValidationErrorKind::Type { kind } => {
                let types = match kind {
                    TypeKind::Single(single) => single.to_string(),
                    TypeKind::Multiple(multiple) => multiple
                        .iter()
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                };
                messages.push(format!("{} is not of type: {types}", subject(&path)));
            }
            other => match error_type_label(other) {
                Some(label) => {
                    messages.push(format!("{} is invalid: error_type={label}", subject(&path)));
                }
                None => {
                    messages.push(format!("{} is invalid: {error}", subject(&path)));
                }
            },
        }
    }

    let mut formatted: Vec<String> = missing_keys
        .into_iter()
        .map(|(path, keys)| {
            format!(
                "{} is missing required keys: {}",
                subject(&path),
                keys.join(", ")
            )
        })
        .collect();
    formatted.extend(messages);
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn supported_list() -> String {
        registry::supported_versions(ReportType::Dast).join(", ")
    }

    fn valid_report(version: &str) -> serde_json::Value {
        json!({
            "version": version,
            "vulnerabilities": [],
            "scan": {
                "analyzer": {
                    "id": "my-dast-analyzer",
                    "name": "My DAST analyzer",
                    "version": "0.1.0",
                    "vendor": { "name": "A DAST analyzer" }
                },
                "scanner": {
                    "id": "my-dast-scanner",
                    "name": "My DAST scanner",
                    "version": "0.2.0",
                    "vendor": { "name": "A DAST scanner" }
                },
                "start_time": "2020-01-28T03:26:01",
                "end_time": "2020-01-28T03:26:02",
                "status": "success",
                "type": "dast",
                "scanned_resources": []
            }
        })
    }

    fn ctx() -> ValidationContext {
        ValidationContext {
            project_id: Some(42),
            scanner_id: Some("gemnasium".to_string()),
            scanner_version: Some("2.1.0".to_string()),
        }
    }

    #[test]
    fn test_supported_version_with_valid_report() {
        let report = valid_report("15.0.0");
        let result = validate_report(ReportType::Dast, &report, Some("15.0.0"), &ctx());

        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.deprecation_warnings.is_empty());
    }

    #[test]
    fn test_supported_version_with_invalid_report() {
        let report = json!({ "version": "15.0.0" });
        let result = validate_report(ReportType::Dast, &report, Some("15.0.0"), &ctx());

        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["root is missing required keys: scan, vulnerabilities".to_string()]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_version_is_never_valid() {
        let report = json!({ "vulnerabilities": [] });
        let result = validate_report(ReportType::Dast, &report, None, &ctx());

        assert!(!result.valid);
        let expected = format!(
            "Report version not provided, dast report type supports versions: {}. Validation \
             will be attempted against the earliest supported version of this report type, to \
             show all the errors but the report will not be ingested",
            supported_list()
        );
        assert!(result.errors.contains(&expected));
        // Validated against the earliest supported schema, which requires a
        // version property.
        assert!(
            result
                .errors
                .iter()
                .any(|e| e == "root is missing required keys: version")
        );
    }

    #[test]
    fn test_unsupported_version_is_never_valid() {
        let report = json!({ "version": "12.37.0", "vulnerabilities": [] });
        let result = validate_report(ReportType::Dast, &report, Some("12.37.0"), &ctx());

        assert!(!result.valid);
        let expected = format!(
            "Version 12.37.0 for report type dast is unsupported, supported versions for this \
             report type are: {}. Validation will be attempted against the earliest supported \
             version of this report type, to show all the errors but the report will not be \
             ingested",
            supported_list()
        );
        assert_eq!(result.errors, vec![expected]);
    }

    #[test]
    fn test_unsupported_version_with_invalid_report_collects_both() {
        let report = json!({ "version": "12.37.0" });
        let result = validate_report(ReportType::Dast, &report, Some("12.37.0"), &ctx());

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e == "root is missing required keys: vulnerabilities")
        );
    }

    #[test]
    fn test_deprecated_version_with_conforming_report_is_valid() {
        let report = json!({ "version": "13.1.0", "vulnerabilities": [] });
        let result = validate_report(ReportType::Dast, &report, Some("13.1.0"), &ctx());

        assert!(result.valid);
        assert!(result.errors.is_empty());
        let expected = format!(
            "Version 13.1.0 for report type dast has been deprecated, supported versions for \
             this report type are: {}. The report will be parsed and ingested if valid.",
            supported_list()
        );
        assert_eq!(result.deprecation_warnings, vec![expected]);
    }

    #[test]
    fn test_deprecated_version_with_invalid_report() {
        let report = json!({ "version": "V2.7.0" });
        let result = validate_report(ReportType::Dast, &report, Some("13.1.0"), &ctx());

        assert!(!result.valid);
        assert!(!result.deprecation_warnings.is_empty());
        assert!(
            result
                .errors
                .iter()
                .any(|e| e == "root is missing required keys: vulnerabilities")
        );
        assert!(
            result
                .errors
                .iter()
                .any(|e| e
                    == "property '/version' does not match pattern: ^[0-9]+\\.[0-9]+\\.[0-9]+$")
        );
    }

    #[test]
    fn test_patch_substitution_warns_and_validates() {
        let report = valid_report("15.0.34");
        let result = validate_report(ReportType::Dast, &report, Some("15.0.34"), &ctx());

        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![
                "This report uses a supported MAJOR.MINOR schema version but the PATCH version \
                 doesn't match any vendored schema version. Validation will be attempted \
                 against version 15.0.0"
                    .to_string()
            ]
        );
        assert!(result.deprecation_warnings.is_empty());
    }

    #[test]
    fn test_patch_substitution_with_invalid_report() {
        let report = json!({ "version": "15.0.34" });
        let result = validate_report(ReportType::Dast, &report, Some("15.0.34"), &ctx());

        assert!(!result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e == "root is missing required keys: scan, vulnerabilities")
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let report = json!({ "version": "12.37.0" });
        let first = validate_report(ReportType::Dast, &report, Some("12.37.0"), &ctx());
        let second = validate_report(ReportType::Dast, &report, Some("12.37.0"), &ctx());

        assert_eq!(first, second);
    }

    #[test]
    fn test_garbage_version_string_falls_into_unsupported() {
        let report = json!({ "version": "not-a-version", "vulnerabilities": [] });
        let result = validate_report(ReportType::Dast, &report, Some("not-a-version"), &ctx());

        assert!(!result.valid);
        assert!(result.errors[0].contains("is unsupported"));
    }

    #[test]
    fn test_empty_context_does_not_panic() {
        let report = json!({});
        let result = validate_report(
            ReportType::SecretDetection,
            &report,
            None,
            &ValidationContext::default(),
        );

        assert!(!result.valid);
    }
}
