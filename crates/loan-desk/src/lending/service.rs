use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::amortization::{compute_schedule, ScheduleSummary};
use super::approval::ApprovalConfig;
use super::catalog::{BankProduct, ProductCatalog};
use super::domain::{
    ApplicationId, CustomerId, InstallmentLine, LendingError, ProductId, Verdict,
};
use super::repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, RepositoryError,
};
use super::workflow::{ApplicationInput, ApplicationWorkflow};

pub const DEFAULT_MAX_QUOTE_TERM: u32 = 480;

/// Calculator input. With `product_id` the product's rate and bounds apply and
/// `interest_rate` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub principal: Decimal,
    pub term_months: u32,
    /// Monthly interest in percent.
    #[serde(default)]
    pub interest_rate: Decimal,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub principal: Decimal,
    pub term_months: u32,
    pub interest_rate: Decimal,
    pub summary: ScheduleSummary,
    pub schedule: Vec<InstallmentLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub product_id: ProductId,
    pub amount: Decimal,
    pub term_months: u32,
    pub income: Decimal,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Service composing the catalog, the application workflow and storage.
pub struct LoanApplicationService<R, C> {
    repository: Arc<R>,
    catalog: Arc<C>,
    workflow: Arc<ApplicationWorkflow>,
    max_quote_term: u32,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, C> LoanApplicationService<R, C>
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>, config: ApprovalConfig) -> Self {
        Self {
            repository,
            catalog,
            workflow: Arc::new(ApplicationWorkflow::new(config)),
            max_quote_term: DEFAULT_MAX_QUOTE_TERM,
        }
    }

    pub fn with_max_quote_term(mut self, max_quote_term: u32) -> Self {
        self.max_quote_term = max_quote_term;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Price a loan without recording anything.
    pub fn quote(&self, request: QuoteRequest) -> Result<Quote, LoanServiceError> {
        if request.term_months > self.max_quote_term {
            return Err(LendingError::InvalidArgument(format!(
                "term cannot exceed {} months",
                self.max_quote_term
            ))
            .into());
        }

        let interest_rate = match request.product_id {
            Some(product_id) => {
                let product = self.active_product(product_id)?;
                ApplicationWorkflow::validate(
                    &product.range,
                    request.principal,
                    request.term_months,
                )?;
                product.range.interest_rate
            }
            None => request.interest_rate,
        };

        let start_date = request
            .start_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let schedule = compute_schedule(
            request.principal,
            interest_rate / Decimal::ONE_HUNDRED,
            request.term_months,
            start_date,
        )?;

        Ok(Quote {
            principal: request.principal,
            term_months: request.term_months,
            interest_rate,
            summary: ScheduleSummary::from_lines(&schedule),
            schedule,
        })
    }

    /// Validate, price, classify and store a new application.
    pub fn apply(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, LoanServiceError> {
        let product = self.active_product(submission.product_id)?;

        if let Some(customer_id) = &submission.customer_id {
            let already_applied = self
                .repository
                .for_customer(customer_id)?
                .iter()
                .any(|record| record.product_id == product.id);
            if already_applied {
                return Err(LoanServiceError::DuplicateApplication {
                    customer_id: customer_id.clone(),
                    product_id: product.id,
                });
            }
        }

        let input = ApplicationInput {
            amount: submission.amount,
            term_months: submission.term_months,
            income: submission.income,
            start_date: submission.start_date,
        };
        let submitted_at = Utc::now();
        let outcome = self
            .workflow
            .run(&product.range, &input, submitted_at.date_naive())?;

        let record = ApplicationRecord {
            id: next_application_id(),
            customer_id: submission.customer_id,
            product_id: product.id,
            bank_name: product.bank_name,
            product_name: product.product_name,
            requested_amount: submission.amount,
            term_months: submission.term_months,
            income: submission.income,
            interest_rate: product.range.interest_rate,
            monthly_payment: outcome.summary.monthly_payment,
            total_payment: outcome.summary.total_payment,
            category: product.range.category,
            verdict: outcome.assessment.verdict,
            assessment: outcome.assessment,
            decision_note: None,
            submitted_at,
            schedule: outcome.schedule,
        };

        let stored = self.repository.insert(record)?;
        info!(
            application_id = %stored.id,
            bank = %stored.bank_name,
            product = %stored.product_name,
            applicant = submission.applicant_name.as_deref().unwrap_or("anonymous"),
            amount = %stored.requested_amount,
            term_months = stored.term_months,
            monthly_payment = %stored.monthly_payment,
            verdict = stored.verdict.label(),
            rule = ?stored.assessment.rule,
            "loan application recorded"
        );
        Ok(stored)
    }

    /// Officer override marking an application approved.
    pub fn approve(&self, id: &ApplicationId) -> Result<ApplicationRecord, LoanServiceError> {
        self.override_verdict(id, Verdict::Approved, "approved by loan officer".to_string())
    }

    /// Officer override rejecting an application with a stated reason.
    pub fn reject(
        &self,
        id: &ApplicationId,
        reason: &str,
    ) -> Result<ApplicationRecord, LoanServiceError> {
        let reason = reason.trim();
        let note = if reason.is_empty() {
            "rejected by loan officer".to_string()
        } else {
            format!("rejected by loan officer: {reason}")
        };
        self.override_verdict(id, Verdict::Rejected, note)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, LoanServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| LoanServiceError::ApplicationNotFound(id.clone()))
    }

    /// Application history of a customer, newest first.
    pub fn customer_applications(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ApplicationStatusView>, LoanServiceError> {
        let mut records = self.repository.for_customer(customer_id)?;
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(records.iter().map(ApplicationRecord::status_view).collect())
    }

    pub fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, LoanServiceError> {
        Ok(self.repository.pending(limit)?)
    }

    fn active_product(&self, product_id: ProductId) -> Result<BankProduct, LoanServiceError> {
        self.catalog
            .product(product_id)?
            .ok_or(LoanServiceError::ProductNotFound(product_id))
    }

    fn override_verdict(
        &self,
        id: &ApplicationId,
        verdict: Verdict,
        note: String,
    ) -> Result<ApplicationRecord, LoanServiceError> {
        let mut record = self.get(id)?;
        let previous = record.verdict;
        record.verdict = verdict;
        record.decision_note = Some(note);

        match self.repository.update(record.clone()) {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => {
                return Err(LoanServiceError::ApplicationNotFound(id.clone()))
            }
            Err(other) => return Err(other.into()),
        }

        if previous != verdict {
            info!(
                application_id = %id,
                from = previous.label(),
                to = verdict.label(),
                "application verdict overridden"
            );
        } else {
            warn!(
                application_id = %id,
                verdict = verdict.label(),
                "override repeated current verdict"
            );
        }
        Ok(record)
    }
}

/// Error raised by the loan application service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Lending(#[from] LendingError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("product {0} not found or inactive")]
    ProductNotFound(ProductId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("customer {customer_id} already applied for product {product_id}")]
    DuplicateApplication {
        customer_id: CustomerId,
        product_id: ProductId,
    },
}
