use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::Verdict;
use super::config::{ApprovalConfig, CategoryThresholds};
use super::rules::{evaluate_tiers, ApprovalSignals};

/// The rule that settled a verdict, kept for audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    IncomeFloor,
    AmountCeiling,
    PaymentCeiling,
    TermCeiling,
    ApproveBand,
    ReviewBand,
    Fallthrough,
}

impl DecisionRule {
    pub const fn verdict(self) -> Verdict {
        match self {
            DecisionRule::IncomeFloor
            | DecisionRule::AmountCeiling
            | DecisionRule::PaymentCeiling
            | DecisionRule::TermCeiling => Verdict::Rejected,
            DecisionRule::ApproveBand => Verdict::Approved,
            DecisionRule::ReviewBand | DecisionRule::Fallthrough => Verdict::UnderReview,
        }
    }

    pub fn summary(self, thresholds: &CategoryThresholds, minimum_income: Decimal) -> String {
        match self {
            DecisionRule::IncomeFloor => {
                format!("income below the {minimum_income} minimum")
            }
            DecisionRule::AmountCeiling => format!(
                "amount exceeds {}x declared income",
                thresholds.reject_amount_to_income
            ),
            DecisionRule::PaymentCeiling => format!(
                "monthly payment exceeds {} of declared income",
                thresholds.reject_payment_to_income
            ),
            DecisionRule::TermCeiling => format!(
                "term exceeds {} months",
                thresholds.reject_term_months
            ),
            DecisionRule::ApproveBand => "meets the approval band".to_string(),
            DecisionRule::ReviewBand => "within the review band".to_string(),
            DecisionRule::Fallthrough => "no band matched, referred for review".to_string(),
        }
    }
}

pub(crate) fn decide(
    config: &ApprovalConfig,
    thresholds: &CategoryThresholds,
    signals: &ApprovalSignals,
) -> DecisionRule {
    if signals.income < config.minimum_income {
        return DecisionRule::IncomeFloor;
    }

    evaluate_tiers(signals, thresholds)
}
