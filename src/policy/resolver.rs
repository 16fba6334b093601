//! Ref-scoped policy queries
//!
//! Pure functions over a parsed [`PolicyDocument`]: which policies are
//! active, and which scan actions apply to a given ref. A missing or
//! unparseable document degrades to empty results at the caller
//! ([`PolicyDocument::parse_opt`]); nothing here fails.

use serde::{Deserialize, Serialize};

use crate::policy::refs::{self, GitRef};
use crate::policy::{
    POLICY_LIMIT, PolicyDocument, PolicyRule, ScanAction, ScanExecutionPolicy, ScanResultPolicy,
    ScanType,
};

/// Whether a policy configuration belongs to a single project or to a
/// namespace of projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    Project,
    Namespace,
}

/// The two policy kinds a document can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    ScanExecution,
    ScanResult,
}

impl PolicyKind {
    pub fn key(&self) -> &'static str {
        match self {
            PolicyKind::ScanExecution => "scan_execution_policy",
            PolicyKind::ScanResult => "scan_result_policy",
        }
    }
}

impl PolicyDocument {
    /// Raw entries of the requested policy kind, `[]` when absent.
    pub fn policy_by_type(&self, kind: PolicyKind) -> &[serde_json::Value] {
        self.raw_entries(kind.key())
    }

    /// Enabled scan execution policies in source order, capped at
    /// [`POLICY_LIMIT`].
    pub fn active_execution_policies(&self) -> Vec<&ScanExecutionPolicy> {
        self.scan_execution_policy
            .iter()
            .filter(|policy| policy.enabled)
            .take(POLICY_LIMIT)
            .collect()
    }

    /// Enabled scan result policies, capped at [`POLICY_LIMIT`]. Result
    /// policies only apply to project-level configurations; namespace
    /// configurations always get an empty list.
    pub fn active_result_policies(&self, scope: PolicyScope) -> Vec<&ScanResultPolicy> {
        if scope == PolicyScope::Namespace {
            return Vec::new();
        }

        self.scan_result_policy
            .iter()
            .filter(|policy| policy.enabled)
            .take(POLICY_LIMIT)
            .collect()
    }

    /// Active execution policies with a pipeline rule matching the branch.
    fn policies_for_branch(&self, branch: &str) -> Vec<&ScanExecutionPolicy> {
        self.active_execution_policies()
            .into_iter()
            .filter(|policy| {
                policy.rules.iter().any(|rule| match rule {
                    PolicyRule::Pipeline { branches } => refs::branch_matches(branches, branch),
                    PolicyRule::Schedule { .. } => false,
                })
            })
            .collect()
    }

    /// Scan actions to inject into a pipeline for `git_ref`, in policy
    /// declaration order then action order. DAST actions are excluded; they
    /// run through the on-demand path instead.
    pub fn pipeline_actions(&self, git_ref: &str) -> Vec<&ScanAction> {
        let Some(branch) = GitRef::parse(git_ref).branch_name() else {
            return Vec::new();
        };

        self.policies_for_branch(branch)
            .into_iter()
            .flat_map(|policy| {
                policy
                    .actions
                    .iter()
                    .filter(|action| action.scan != ScanType::Dast)
            })
            .collect()
    }

    /// DAST actions applicable to `git_ref`. On-demand scans are scoped to
    /// branches: tag refs always yield an empty list, whatever the rules
    /// match.
    pub fn on_demand_actions(&self, git_ref: &str) -> Vec<&ScanAction> {
        let Some(branch) = GitRef::parse(git_ref).branch_name() else {
            return Vec::new();
        };

        self.policies_for_branch(branch)
            .into_iter()
            .flat_map(|policy| {
                policy
                    .actions
                    .iter()
                    .filter(|action| action.scan == ScanType::Dast)
            })
            .collect()
    }

    /// Names of active policies with a DAST action referencing the site
    /// profile, deduplicated in source order.
    pub fn policy_names_for_site_profile(&self, profile: &str) -> Vec<String> {
        self.policy_names_matching(|action| action.site_profile.as_deref() == Some(profile))
    }

    /// Names of active policies with a DAST action referencing the scanner
    /// profile, deduplicated in source order.
    pub fn policy_names_for_scanner_profile(&self, profile: &str) -> Vec<String> {
        self.policy_names_matching(|action| action.scanner_profile.as_deref() == Some(profile))
    }

    fn policy_names_matching(&self, matches: impl Fn(&ScanAction) -> bool) -> Vec<String> {
        let mut names = Vec::new();
        for policy in self.active_execution_policies() {
            let referenced = policy
                .actions
                .iter()
                .any(|action| action.scan == ScanType::Dast && matches(action));
            if referenced && !names.contains(&policy.name) {
                names.push(policy.name.clone());
            }
        }
        names
    }
}
