//! Policy document validation
//!
//! Structural validation against the vendored policy-document schema plus
//! the semantic checks the schema cannot express: scan-type field
//! restrictions, name length, reserved names, cadence grammar, and approver
//! presence. All problems accumulate into one [`ValidationResult`].

use once_cell::sync::Lazy;

use crate::error::RegistryError;
use crate::policy::cadence::Cadence;
use crate::policy::{
    ApprovalAction, MAX_POLICY_NAME_LENGTH, PolicyDocument, PolicyRule, RESERVED_POLICY_NAMES,
    ScanExecutionPolicy, ScanResultPolicy,
};
use crate::schema::{self, ValidationResult};

const POLICY_SCHEMA_SOURCE: &str = include_str!("schemas/security-orchestration-policy.json");

static POLICY_VALIDATOR: Lazy<Option<jsonschema::Validator>> = Lazy::new(|| {
    let schema: serde_json::Value = serde_json::from_str(POLICY_SCHEMA_SOURCE).ok()?;
    jsonschema::validator_for(&schema).ok()
});

/// Startup invariant: the vendored policy schema parses and compiles.
pub(crate) fn verify() -> Result<(), RegistryError> {
    let schema: serde_json::Value = serde_json::from_str(POLICY_SCHEMA_SOURCE)
        .map_err(|err| RegistryError::InvalidPolicySchema(err.to_string()))?;
    jsonschema::validator_for(&schema)
        .map_err(|err| RegistryError::InvalidPolicySchema(err.to_string()))?;
    Ok(())
}

/// Validate a parsed policy document.
///
/// Runs the JSON-schema check over the raw tree first, so entries the typed
/// view dropped still get structural errors with exact instance paths, then
/// the semantic checks over every entry that does deserialize.
pub fn validate_document(doc: &PolicyDocument) -> ValidationResult {
    let mut errors = Vec::new();

    match POLICY_VALIDATOR.as_ref() {
        Some(validator) => errors.extend(schema::format_schema_errors(validator, doc.raw())),
        // verify() reports the reason at startup; here we can only refuse.
        None => errors.push("policy document schema is unavailable".to_string()),
    }

    for (index, entry) in doc.raw_entries("scan_execution_policy").iter().enumerate() {
        // Typed parse per raw entry keeps indices aligned with the schema
        // errors even when earlier entries were dropped from the typed view.
        match serde_json::from_value::<ScanExecutionPolicy>(entry.clone()) {
            Ok(policy) => check_execution_policy(index, &policy, &mut errors),
            Err(_) => ensure_entry_flagged("scan_execution_policy", index, &mut errors),
        }
    }

    for (index, entry) in doc.raw_entries("scan_result_policy").iter().enumerate() {
        match serde_json::from_value::<ScanResultPolicy>(entry.clone()) {
            Ok(policy) => check_result_policy(index, &policy, &mut errors),
            Err(_) => ensure_entry_flagged("scan_result_policy", index, &mut errors),
        }
    }

    ValidationResult::from_errors(errors)
}

/// Whether the document passes every structural and semantic check.
pub fn document_valid(doc: &PolicyDocument) -> bool {
    validate_document(doc).valid
}

/// The accumulated error strings, `[]` for a valid document.
pub fn validation_errors(doc: &PolicyDocument) -> Vec<String> {
    validate_document(doc).errors
}

/// An entry the typed model rejects must not leave the error list clean.
/// Usually the schema check has already said why; where the schema is looser
/// than the model (negative approver ids, for one), a generic error is
/// attached so the entry cannot vanish from a "valid" document.
fn ensure_entry_flagged(key: &str, index: usize, errors: &mut Vec<String>) {
    let exact = format!("'/{key}/{index}'");
    let nested = format!("'/{key}/{index}/");
    if errors
        .iter()
        .any(|error| error.contains(&exact) || error.contains(&nested))
    {
        return;
    }

    errors.push(format!(
        "property '/{key}/{index}' is invalid: entry does not match the expected policy shape"
    ));
}

fn check_execution_policy(index: usize, policy: &ScanExecutionPolicy, errors: &mut Vec<String>) {
    check_name_length(&policy.name, "scan_execution_policy", index, errors);

    for (rule_index, rule) in policy.rules.iter().enumerate() {
        if let PolicyRule::Schedule { cadence, .. } = rule {
            if let Err(err) = Cadence::parse(cadence) {
                errors.push(format!(
                    "property '/scan_execution_policy/{index}/rules/{rule_index}/cadence' \
                     is invalid: {err}"
                ));
            }
        }
    }

    for (action_index, action) in policy.actions.iter().enumerate() {
        let permitted = action.scan.permitted_fields();
        let profile_set = [
            ("site_profile", action.site_profile.is_some()),
            ("scanner_profile", action.scanner_profile.is_some()),
        ];
        let disallowed = profile_set
            .iter()
            .any(|(field, present)| *present && !permitted.contains(field));

        if disallowed {
            errors.push(format!(
                "property '/scan_execution_policy/{index}/actions/{action_index}' is invalid: \
                 error_type=maxProperties"
            ));
        }
    }
}

fn check_result_policy(index: usize, policy: &ScanResultPolicy, errors: &mut Vec<String>) {
    check_name_length(&policy.name, "scan_result_policy", index, errors);

    // Exact match only; decorated variants of a reserved name are allowed.
    if RESERVED_POLICY_NAMES.contains(&policy.name.as_str()) {
        errors.push(format!(
            "property '/scan_result_policy/{index}/name' is invalid: '{}' is a reserved policy \
             name",
            policy.name
        ));
    }

    for (action_index, action) in policy.actions.iter().enumerate() {
        let ApprovalAction::RequireApproval(approval) = action;
        if !approval.has_approvers() {
            errors.push(format!(
                "property '/scan_result_policy/{index}/actions/{action_index}' is invalid: \
                 at least one of user_approvers, user_approvers_ids, group_approvers, \
                 group_approvers_ids must be non-empty"
            ));
        }
    }
}

fn check_name_length(name: &str, key: &str, index: usize, errors: &mut Vec<String>) {
    if name.chars().count() > MAX_POLICY_NAME_LENGTH {
        errors.push(format!(
            "property '/{key}/{index}/name' is invalid: error_type=maxLength"
        ));
    }
}
