//! Risk Report Verification
//!
//! Hash-keyed risk reports corroborated by an external verification
//! authority.

pub mod authority;
pub mod registry;
pub mod report;

pub use authority::{
    authority_from_config, AuthorityError, HttpVerificationAuthority, SimulatedAuthority,
    VerificationAuthority,
};
pub use registry::VerificationRegistry;
pub use report::{ReportStatus, ReportSubmission, RiskReport, SubmissionOutcome, SubmissionResult};
