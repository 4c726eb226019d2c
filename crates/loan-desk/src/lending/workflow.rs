use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amortization::{compute_schedule, ScheduleSummary};
use super::approval::{ApprovalAssessment, ApprovalClassifier, ApprovalConfig};
use super::domain::{InstallmentLine, LendingError, ProductRange};

/// Figures an applicant supplies for a given product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub amount: Decimal,
    pub term_months: u32,
    pub income: Decimal,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Everything the caller needs to persist an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub schedule: Vec<InstallmentLine>,
    pub summary: ScheduleSummary,
    pub assessment: ApprovalAssessment,
}

/// Range check, schedule and classification for one application. Holds no state
/// beyond the threshold table.
#[derive(Debug, Clone, Default)]
pub struct ApplicationWorkflow {
    classifier: ApprovalClassifier,
}

impl ApplicationWorkflow {
    pub fn new(config: ApprovalConfig) -> Self {
        Self {
            classifier: ApprovalClassifier::new(config),
        }
    }

    pub fn validate(
        range: &ProductRange,
        amount: Decimal,
        term_months: u32,
    ) -> Result<(), LendingError> {
        if !range.contains_amount(amount) {
            return Err(LendingError::OutOfRange(format!(
                "loan amount must be between {} and {}, got {}",
                range.min_amount, range.max_amount, amount
            )));
        }
        if !range.contains_term(term_months) {
            return Err(LendingError::OutOfRange(format!(
                "term must be between {} and {} months, got {}",
                range.min_term, range.max_term, term_months
            )));
        }
        Ok(())
    }

    pub fn run(
        &self,
        range: &ProductRange,
        input: &ApplicationInput,
        today: NaiveDate,
    ) -> Result<WorkflowOutcome, LendingError> {
        Self::validate(range, input.amount, input.term_months)?;

        let schedule = compute_schedule(
            input.amount,
            range.monthly_rate(),
            input.term_months,
            input.start_date.unwrap_or(today),
        )?;
        let summary = ScheduleSummary::from_lines(&schedule);

        let assessment = self.classifier.assess(
            range.category,
            input.income,
            input.amount,
            input.term_months,
            summary.monthly_payment,
        );

        Ok(WorkflowOutcome {
            schedule,
            summary,
            assessment,
        })
    }
}
