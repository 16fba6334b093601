//! Security scan orchestration policy engine
//!
//! Two validation surfaces plus a resolver:
//!
//! - [`schema::validate_report`] checks a parsed security report against a
//!   vendored JSON Schema, resolving the declared version to the best
//!   available schema;
//! - [`policy::validation::validate_document`] checks a YAML policy document
//!   structurally and semantically;
//! - the resolver methods on [`PolicyDocument`] answer ref-scoped queries
//!   (which scans run in a pipeline, which DAST scans run on demand).
//!
//! Both validators collect problems instead of failing fast; malformed user
//! input never raises.

pub mod cli;
pub mod error;
pub mod output;
pub mod policy;
pub mod schema;

pub use error::{Error, Result};
pub use policy::PolicyDocument;
pub use schema::{ReportType, ValidationContext, ValidationResult, validate_report};

/// Verify packaging invariants once at startup: every listed report schema
/// version has a vendored schema that compiles, and the policy document
/// schema compiles.
pub fn verify() -> Result<()> {
    schema::registry::verify()?;
    policy::validation::verify()?;
    Ok(())
}
