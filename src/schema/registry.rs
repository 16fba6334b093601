//! Vendored report schema registry
//!
//! Every supported and deprecated schema version ships embedded in the
//! binary. The compiled validators live in a process-wide read-only table,
//! built once on first use and never mutated. [`verify`] is the startup
//! invariant check: it confirms the version tables and vendored schemas are
//! consistent so that validation calls never have to handle a missing
//! schema.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Security report types with vendored schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ReportType {
    Sast,
    Dast,
    SecretDetection,
    ContainerScanning,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Sast,
        ReportType::Dast,
        ReportType::SecretDetection,
        ReportType::ContainerScanning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Sast => "sast",
            ReportType::Dast => "dast",
            ReportType::SecretDetection => "secret_detection",
            ReportType::ContainerScanning => "container_scanning",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema versions accepted for ingestion, ascending. One table per report
/// type; the tables currently agree across types but are kept per-type so a
/// single report format can move independently.
pub fn supported_versions(report_type: ReportType) -> &'static [&'static str] {
    match report_type {
        ReportType::Sast
        | ReportType::Dast
        | ReportType::SecretDetection
        | ReportType::ContainerScanning => &["14.0.0", "14.1.0", "15.0.0"],
    }
}

/// Exact versions that have been retired. Disjoint from the supported set;
/// documents declaring one still validate against the retired schema but a
/// deprecation warning is attached.
pub fn deprecated_versions(report_type: ReportType) -> &'static [&'static str] {
    match report_type {
        ReportType::Sast
        | ReportType::Dast
        | ReportType::SecretDetection
        | ReportType::ContainerScanning => &["13.1.0"],
    }
}

macro_rules! vendored {
    ($version:literal, $file:literal) => {
        include_str!(concat!("schemas/", $version, "/", $file))
    };
}

/// Raw vendored schema source for a (type, version) pair.
fn schema_source(report_type: ReportType, version: &str) -> Option<&'static str> {
    let source = match (report_type, version) {
        (ReportType::Sast, "13.1.0") => vendored!("13.1.0", "sast-report-format.json"),
        (ReportType::Sast, "14.0.0") => vendored!("14.0.0", "sast-report-format.json"),
        (ReportType::Sast, "14.1.0") => vendored!("14.1.0", "sast-report-format.json"),
        (ReportType::Sast, "15.0.0") => vendored!("15.0.0", "sast-report-format.json"),
        (ReportType::Dast, "13.1.0") => vendored!("13.1.0", "dast-report-format.json"),
        (ReportType::Dast, "14.0.0") => vendored!("14.0.0", "dast-report-format.json"),
        (ReportType::Dast, "14.1.0") => vendored!("14.1.0", "dast-report-format.json"),
        (ReportType::Dast, "15.0.0") => vendored!("15.0.0", "dast-report-format.json"),
        (ReportType::SecretDetection, "13.1.0") => {
            vendored!("13.1.0", "secret-detection-report-format.json")
        }
        (ReportType::SecretDetection, "14.0.0") => {
            vendored!("14.0.0", "secret-detection-report-format.json")
        }
        (ReportType::SecretDetection, "14.1.0") => {
            vendored!("14.1.0", "secret-detection-report-format.json")
        }
        (ReportType::SecretDetection, "15.0.0") => {
            vendored!("15.0.0", "secret-detection-report-format.json")
        }
        (ReportType::ContainerScanning, "13.1.0") => {
            vendored!("13.1.0", "container-scanning-report-format.json")
        }
        (ReportType::ContainerScanning, "14.0.0") => {
            vendored!("14.0.0", "container-scanning-report-format.json")
        }
        (ReportType::ContainerScanning, "14.1.0") => {
            vendored!("14.1.0", "container-scanning-report-format.json")
        }
        (ReportType::ContainerScanning, "15.0.0") => {
            vendored!("15.0.0", "container-scanning-report-format.json")
        }
        _ => return None,
    };

    Some(source)
}

fn known_versions(report_type: ReportType) -> impl Iterator<Item = &'static str> {
    supported_versions(report_type)
        .iter()
        .chain(deprecated_versions(report_type))
        .copied()
}

static VALIDATORS: Lazy<HashMap<(ReportType, &'static str), jsonschema::Validator>> =
    Lazy::new(|| {
        let mut validators = HashMap::new();
        for report_type in ReportType::ALL {
            for version in known_versions(report_type) {
                let Some(source) = schema_source(report_type, version) else {
                    continue;
                };
                let Ok(schema) = serde_json::from_str(source) else {
                    continue;
                };
                if let Ok(validator) = jsonschema::validator_for(&schema) {
                    validators.insert((report_type, version), validator);
                }
            }
        }
        validators
    });

/// Compiled validator for a (type, version) pair. `None` only when the
/// registry is inconsistent, which [`verify`] rules out at startup.
pub(crate) fn validator_for(
    report_type: ReportType,
    version: &str,
) -> Option<&'static jsonschema::Validator> {
    VALIDATORS
        .iter()
        .find(|((listed_type, listed_version), _)| {
            *listed_type == report_type && *listed_version == version
        })
        .map(|(_, validator)| validator)
}

/// Startup invariant: every listed version, supported or deprecated, has a
/// vendored schema that parses and compiles.
pub fn verify() -> Result<(), RegistryError> {
    for report_type in ReportType::ALL {
        for version in known_versions(report_type) {
            let source =
                schema_source(report_type, version).ok_or_else(|| RegistryError::MissingSchema {
                    report_type: report_type.to_string(),
                    version: version.to_string(),
                })?;

            let schema: serde_json::Value =
                serde_json::from_str(source).map_err(|err| RegistryError::InvalidSchema {
                    report_type: report_type.to_string(),
                    version: version.to_string(),
                    message: err.to_string(),
                })?;

            jsonschema::validator_for(&schema).map_err(|err| RegistryError::InvalidSchema {
                report_type: report_type.to_string(),
                version: version.to_string(),
                message: err.to_string(),
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_passes_for_vendored_schemas() {
        verify().expect("registry must be internally consistent");
    }

    #[test]
    fn test_supported_and_deprecated_tables_cover_same_types() {
        for report_type in ReportType::ALL {
            assert!(
                !supported_versions(report_type).is_empty(),
                "{report_type} has no supported versions"
            );
            assert!(
                !deprecated_versions(report_type).is_empty(),
                "{report_type} has no deprecated versions"
            );
        }
    }

    #[test]
    fn test_supported_and_deprecated_versions_are_disjoint() {
        for report_type in ReportType::ALL {
            for version in deprecated_versions(report_type) {
                assert!(
                    !supported_versions(report_type).contains(version),
                    "{version} is both supported and deprecated for {report_type}"
                );
            }
        }
    }

    #[test]
    fn test_supported_versions_are_ascending() {
        use crate::schema::version::SchemaVersion;

        for report_type in ReportType::ALL {
            let versions: Vec<SchemaVersion> = supported_versions(report_type)
                .iter()
                .map(|v| v.parse().unwrap())
                .collect();
            let mut sorted = versions.clone();
            sorted.sort();
            assert_eq!(versions, sorted);
        }
    }

    #[test]
    fn test_every_known_version_has_a_compiled_validator() {
        for report_type in ReportType::ALL {
            for version in known_versions(report_type) {
                assert!(
                    validator_for(report_type, version).is_some(),
                    "no compiled validator for {report_type} {version}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_version_has_no_validator() {
        assert!(validator_for(ReportType::Dast, "99.0.0").is_none());
    }
}
