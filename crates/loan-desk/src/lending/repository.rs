use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::approval::ApprovalAssessment;
use super::domain::{
    ApplicationId, CustomerId, InstallmentLine, LoanCategory, ProductId, Verdict,
};

/// Persisted application together with its amortization plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub customer_id: Option<CustomerId>,
    pub product_id: ProductId,
    pub bank_name: String,
    pub product_name: String,
    pub requested_amount: Decimal,
    pub term_months: u32,
    pub income: Decimal,
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    pub total_payment: Decimal,
    pub category: LoanCategory,
    pub verdict: Verdict,
    pub assessment: ApprovalAssessment,
    /// Set when an officer overrides the computed verdict.
    pub decision_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub schedule: Vec<InstallmentLine>,
}

impl ApplicationRecord {
    pub fn decision_rationale(&self) -> String {
        match &self.decision_note {
            Some(note) => note.clone(),
            None => self.assessment.rationale.clone(),
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            bank_name: self.bank_name.clone(),
            product_name: self.product_name.clone(),
            requested_amount: self.requested_amount,
            term_months: self.term_months,
            monthly_payment: self.monthly_payment,
            status: self.verdict.label(),
            decision_rationale: self.decision_rationale(),
            submitted_at: self.submitted_at,
        }
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn for_customer(&self, customer: &CustomerId)
        -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Customer-facing summary of an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub bank_name: String,
    pub product_name: String,
    pub requested_amount: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    pub status: &'static str,
    pub decision_rationale: String,
    pub submitted_at: DateTime<Utc>,
}
