mod config;
mod policy;
mod rules;

pub use config::{ApprovalConfig, CategoryThresholds};
pub use policy::DecisionRule;

use super::domain::{LoanCategory, Verdict};
use policy::decide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stateless classifier applying the threshold table to an application.
#[derive(Debug, Clone, Default)]
pub struct ApprovalClassifier {
    config: ApprovalConfig,
}

impl ApprovalClassifier {
    pub fn new(config: ApprovalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    pub fn classify(
        &self,
        category: LoanCategory,
        income: Decimal,
        requested_amount: Decimal,
        term_months: u32,
        monthly_payment: Decimal,
    ) -> Verdict {
        self.assess(category, income, requested_amount, term_months, monthly_payment)
            .verdict
    }

    /// String form of [`ApprovalClassifier::classify`]; unrecognised names use the general table.
    pub fn classify_named(
        &self,
        category: &str,
        income: Decimal,
        requested_amount: Decimal,
        term_months: u32,
        monthly_payment: Decimal,
    ) -> Verdict {
        self.classify(
            LoanCategory::resolve(category),
            income,
            requested_amount,
            term_months,
            monthly_payment,
        )
    }

    pub fn assess(
        &self,
        category: LoanCategory,
        income: Decimal,
        requested_amount: Decimal,
        term_months: u32,
        monthly_payment: Decimal,
    ) -> ApprovalAssessment {
        let thresholds = self.config.thresholds(category);
        let signals =
            rules::derive_signals(income, requested_amount, term_months, monthly_payment);
        let rule = decide(&self.config, thresholds, &signals);

        ApprovalAssessment {
            category,
            verdict: rule.verdict(),
            rule,
            rationale: rule.summary(thresholds, self.config.minimum_income),
            amount_to_income: signals.amount_to_income,
            payment_to_income: signals.payment_to_income,
        }
    }
}

/// Verdict plus the ratios and rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalAssessment {
    pub category: LoanCategory,
    pub verdict: Verdict,
    pub rule: DecisionRule,
    pub rationale: String,
    pub amount_to_income: Decimal,
    pub payment_to_income: Decimal,
}
