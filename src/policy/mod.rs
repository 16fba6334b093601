//! Policy document model
//!
//! Typed representation of the security policy YAML document, parsed in two
//! phases: YAML into a generic JSON tree (kept for schema validation), then
//! per-entry deserialization into the typed policy structs. Entries that do
//! not deserialize are dropped from the typed view; the schema check over
//! the raw tree reports why.

pub mod cadence;
pub mod refs;
pub mod resolver;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Repository-relative path where the policy document conventionally lives.
/// Informational only; this crate never touches a repository itself.
pub const POLICY_PATH: &str = ".security/policy.yml";

/// Maximum number of active policies returned per policy type.
pub const POLICY_LIMIT: usize = 5;

/// Maximum length of a policy name.
pub const MAX_POLICY_NAME_LENGTH: usize = 255;

/// Approval rule names generated by the platform itself. A result policy
/// must not collide with these exactly; decorated variants are fine.
pub const RESERVED_POLICY_NAMES: &[&str] = &["License-Check", "Coverage-Check"];

/// Security scan types that execution policies can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Sast,
    Dast,
    SecretDetection,
    ContainerScanning,
    /// Unrecognized scan tag. Kept so a single bad action does not hide the
    /// rest of the policy from the typed view; the schema check rejects it.
    #[serde(other)]
    Unknown,
}

impl ScanType {
    /// Extra action fields each scan type may carry beyond `scan`.
    pub fn permitted_fields(&self) -> &'static [&'static str] {
        match self {
            ScanType::Dast => &["site_profile", "scanner_profile"],
            _ => &[],
        }
    }
}

/// A single scan action within an execution policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanAction {
    pub scan: ScanType,

    /// DAST site profile name (dast only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_profile: Option<String>,

    /// DAST scanner profile name (dast only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanner_profile: Option<String>,
}

/// Trigger rule for a scan execution policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyRule {
    /// Fires on pipelines for matching branches.
    Pipeline {
        #[serde(default)]
        branches: Vec<String>,
    },

    /// Fires on a cron-like cadence for matching branches.
    Schedule {
        cadence: String,
        #[serde(default)]
        branches: Vec<String>,
    },
}

/// A policy that triggers security scans on pipeline or schedule events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanExecutionPolicy {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,

    #[serde(default)]
    pub actions: Vec<ScanAction>,
}

/// Condition rule for a scan result policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanResultRule {
    /// Matches merge requests whose scan findings exceed the allowed count.
    ScanFinding {
        #[serde(default)]
        branches: Vec<String>,

        #[serde(default)]
        scanners: Vec<String>,

        #[serde(default)]
        vulnerabilities_allowed: u32,

        #[serde(default)]
        severity_levels: Vec<String>,
    },
}

/// Action taken when a scan result policy matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApprovalAction {
    RequireApproval(RequireApproval),
}

/// Approval requirement with its approver references. At least one of the
/// four approver lists must be present and non-empty for the action to be
/// semantically valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequireApproval {
    pub approvals_required: u32,

    /// Approving usernames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_approvers: Option<Vec<String>>,

    /// Approving user ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_approvers_ids: Option<Vec<u64>>,

    /// Approving group paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_approvers: Option<Vec<String>>,

    /// Approving group ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_approvers_ids: Option<Vec<u64>>,
}

impl RequireApproval {
    /// Whether any approver reference is present and non-empty.
    pub fn has_approvers(&self) -> bool {
        let non_empty_strings =
            |list: &Option<Vec<String>>| list.as_ref().is_some_and(|l| !l.is_empty());
        let non_empty_ids = |list: &Option<Vec<u64>>| list.as_ref().is_some_and(|l| !l.is_empty());

        non_empty_strings(&self.user_approvers)
            || non_empty_ids(&self.user_approvers_ids)
            || non_empty_strings(&self.group_approvers)
            || non_empty_ids(&self.group_approvers_ids)
    }
}

/// A policy that requires approvals based on scan results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResultPolicy {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<ScanResultRule>,

    #[serde(default)]
    pub actions: Vec<ApprovalAction>,
}

/// The parsed policy document.
///
/// `raw` keeps the generic tree the YAML parsed into so the schema check can
/// report structural problems with exact instance paths, including entries
/// the typed view had to drop.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    raw: serde_json::Value,
    pub scan_execution_policy: Vec<ScanExecutionPolicy>,
    pub scan_result_policy: Vec<ScanResultPolicy>,
}

impl PolicyDocument {
    /// Parse a raw YAML policy document.
    ///
    /// Syntactically invalid YAML or a non-mapping root is a [`ParseError`];
    /// entries that are a mapping but do not deserialize into the typed
    /// model are kept in the raw tree only, where
    /// [`validation::validate_document`] reports them as schema errors.
    pub fn parse(raw: &str) -> Result<PolicyDocument, ParseError> {
        let value: serde_json::Value = serde_yaml::from_str(raw)?;
        if !value.is_object() {
            return Err(ParseError::NotAMapping);
        }

        let scan_execution_policy = typed_entries(&value, "scan_execution_policy");
        let scan_result_policy = typed_entries(&value, "scan_result_policy");

        Ok(PolicyDocument {
            raw: value,
            scan_execution_policy,
            scan_result_policy,
        })
    }

    /// Parse an optional blob, treating absence and malformed YAML alike as
    /// "no policy configured". Mirrors the degraded query contract: callers
    /// that need the parse failure reason use [`PolicyDocument::parse`].
    pub fn parse_opt(raw: Option<&str>) -> Option<PolicyDocument> {
        raw.and_then(|content| PolicyDocument::parse(content).ok())
    }

    /// The generic tree this document parsed from.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Raw entries of one policy array, `[]` when absent or not an array.
    pub(crate) fn raw_entries(&self, key: &str) -> &[serde_json::Value] {
        self.raw
            .get(key)
            .and_then(|entries| entries.as_array())
            .map_or(&[], |entries| entries.as_slice())
    }
}

fn typed_entries<T: serde::de::DeserializeOwned>(value: &serde_json::Value, key: &str) -> Vec<T> {
    value
        .get(key)
        .and_then(|entries| entries.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
scan_execution_policy:
  - name: Run DAST in every pipeline
    description: This policy enforces to run DAST for every pipeline within the project
    enabled: true
    rules:
      - type: pipeline
        branches:
          - master
    actions:
      - scan: dast
        site_profile: Site Profile
        scanner_profile: Scanner Profile
scan_result_policy:
  - name: Contains security critical severities
    enabled: true
    rules:
      - type: scan_finding
        branches: []
        scanners:
          - container_scanning
        vulnerabilities_allowed: 0
        severity_levels:
          - critical
    actions:
      - type: require_approval
        approvals_required: 1
        user_approvers:
          - admin
"#;

        let doc = PolicyDocument::parse(yaml).unwrap();
        assert_eq!(doc.scan_execution_policy.len(), 1);
        assert_eq!(doc.scan_result_policy.len(), 1);

        let policy = &doc.scan_execution_policy[0];
        assert_eq!(policy.name, "Run DAST in every pipeline");
        assert!(policy.enabled);
        assert_eq!(
            policy.rules,
            vec![PolicyRule::Pipeline {
                branches: vec!["master".to_string()]
            }]
        );
        assert_eq!(policy.actions[0].scan, ScanType::Dast);
        assert_eq!(policy.actions[0].site_profile.as_deref(), Some("Site Profile"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = PolicyDocument::parse("cadence: * 1 2 3");
        assert!(matches!(result, Err(ParseError::Yaml(_))));
    }

    #[test]
    fn test_parse_non_mapping_root() {
        let result = PolicyDocument::parse("- just\n- a\n- list\n");
        assert!(matches!(result, Err(ParseError::NotAMapping)));
    }

    #[test]
    fn test_parse_opt_treats_failures_as_absent() {
        assert!(PolicyDocument::parse_opt(None).is_none());
        assert!(PolicyDocument::parse_opt(Some("cadence: * 1 2 3")).is_none());
        assert!(PolicyDocument::parse_opt(Some("scan_execution_policy: []")).is_some());
    }

    #[test]
    fn test_parse_empty_document_is_not_absent() {
        let doc = PolicyDocument::parse("scan_execution_policy: []").unwrap();
        assert!(doc.scan_execution_policy.is_empty());
        assert!(doc.scan_result_policy.is_empty());
    }

    #[test]
    fn test_malformed_entry_is_dropped_from_typed_view() {
        // branches must be an array; the entry stays in the raw tree for the
        // schema check but does not deserialize.
        let yaml = r#"
scan_execution_policy:
  - name: Broken
    enabled: true
    rules:
      - type: pipeline
        branches: production
    actions:
      - scan: sast
  - name: Fine
    enabled: true
    rules:
      - type: pipeline
        branches: ["*"]
    actions:
      - scan: sast
"#;

        let doc = PolicyDocument::parse(yaml).unwrap();
        assert_eq!(doc.scan_execution_policy.len(), 1);
        assert_eq!(doc.scan_execution_policy[0].name, "Fine");
        assert_eq!(doc.raw_entries("scan_execution_policy").len(), 2);
    }

    #[test]
    fn test_unknown_scan_type_parses_as_unknown() {
        let yaml = r#"
scan_execution_policy:
  - name: Future scan
    enabled: true
    rules: []
    actions:
      - scan: quantum_fuzzing
"#;

        let doc = PolicyDocument::parse(yaml).unwrap();
        assert_eq!(doc.scan_execution_policy[0].actions[0].scan, ScanType::Unknown);
    }

    #[test]
    fn test_has_approvers_requires_a_non_empty_list() {
        let mut action = RequireApproval {
            approvals_required: 1,
            user_approvers: Some(vec![]),
            user_approvers_ids: None,
            group_approvers: None,
            group_approvers_ids: None,
        };
        assert!(!action.has_approvers());

        action.user_approvers_ids = Some(vec![1]);
        assert!(action.has_approvers());
    }

    #[test]
    fn test_permitted_fields_table() {
        assert_eq!(
            ScanType::Dast.permitted_fields(),
            &["site_profile", "scanner_profile"]
        );
        assert!(ScanType::SecretDetection.permitted_fields().is_empty());
        assert!(ScanType::Sast.permitted_fields().is_empty());
    }
}
