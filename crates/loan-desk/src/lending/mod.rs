//! Consumer lending: annuity schedules, rule-based approval, and the application
//! pipeline that ties bank products to both.
//!
//! The calculation core (`amortization`, `approval`, `workflow`) is pure and never
//! touches storage. `service` layers the catalog, duplicate checks and persistence
//! on top, and `router` exposes the service over HTTP.

pub mod amortization;
pub mod approval;
pub mod catalog;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use amortization::{compute_schedule, schedule_for, ScheduleSummary};
pub use approval::{
    ApprovalAssessment, ApprovalClassifier, ApprovalConfig, CategoryThresholds, DecisionRule,
};
pub use catalog::{Bank, BankProduct, CatalogError, CatalogSnapshot, ProductCatalog};
pub use domain::{
    ApplicationId, BankId, CustomerId, InstallmentLine, LendingError, LoanCategory, LoanRequest,
    ProductId, ProductRange, UnknownCategory, Verdict,
};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, RepositoryError,
};
pub use router::lending_router;
pub use service::{
    ApplicationSubmission, LoanApplicationService, LoanServiceError, Quote, QuoteRequest,
    DEFAULT_MAX_QUOTE_TERM,
};
pub use workflow::{ApplicationInput, ApplicationWorkflow, WorkflowOutcome};
