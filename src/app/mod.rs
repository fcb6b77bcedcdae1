// Application layer - Use case interactors

pub mod audit_interactor;
pub mod container;
pub mod explicit_resolver;

// Re-export interactors
pub use audit_interactor::{AuditInteractor, AuditRequest, SummaryFormat};
pub use explicit_resolver::ExplicitResolver;
