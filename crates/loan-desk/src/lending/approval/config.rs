use std::io::Read;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::super::domain::LoanCategory;

/// Ceilings and floors for one loan category. Ratios are multiples of the
/// declared income (`amount / income`, `monthly payment / income`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    pub reject_amount_to_income: Decimal,
    pub reject_payment_to_income: Decimal,
    pub reject_term_months: u32,
    pub approve_min_income: Decimal,
    pub approve_amount_to_income: Decimal,
    pub approve_payment_to_income: Decimal,
    pub review_min_income: Decimal,
    pub review_amount_to_income: Decimal,
    pub review_payment_to_income: Decimal,
}

/// Threshold table driving the approval classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Applicants declaring less than this are rejected before any category rule runs.
    pub minimum_income: Decimal,
    pub housing: CategoryThresholds,
    pub personal: CategoryThresholds,
    pub vehicle: CategoryThresholds,
    pub commercial: CategoryThresholds,
    pub general: CategoryThresholds,
}

impl ApprovalConfig {
    pub fn thresholds(&self, category: LoanCategory) -> &CategoryThresholds {
        match category {
            LoanCategory::Housing => &self.housing,
            LoanCategory::Personal => &self.personal,
            LoanCategory::Vehicle => &self.vehicle,
            LoanCategory::Commercial => &self.commercial,
            LoanCategory::General => &self.general,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            minimum_income: dec!(5000),
            housing: CategoryThresholds {
                reject_amount_to_income: dec!(8),
                reject_payment_to_income: dec!(0.5),
                reject_term_months: 360,
                approve_min_income: dec!(25000),
                approve_amount_to_income: dec!(5),
                approve_payment_to_income: dec!(0.35),
                review_min_income: dec!(15000),
                review_amount_to_income: dec!(6),
                review_payment_to_income: dec!(0.4),
            },
            personal: CategoryThresholds {
                reject_amount_to_income: dec!(3),
                reject_payment_to_income: dec!(0.4),
                reject_term_months: 60,
                approve_min_income: dec!(20000),
                approve_amount_to_income: dec!(2),
                approve_payment_to_income: dec!(0.25),
                review_min_income: dec!(12000),
                review_amount_to_income: dec!(2.5),
                review_payment_to_income: dec!(0.3),
            },
            vehicle: CategoryThresholds {
                reject_amount_to_income: dec!(5),
                reject_payment_to_income: dec!(0.45),
                reject_term_months: 84,
                approve_min_income: dec!(25000),
                approve_amount_to_income: dec!(3),
                approve_payment_to_income: dec!(0.3),
                review_min_income: dec!(15000),
                review_amount_to_income: dec!(4),
                review_payment_to_income: dec!(0.35),
            },
            commercial: CategoryThresholds {
                reject_amount_to_income: dec!(6),
                reject_payment_to_income: dec!(0.5),
                reject_term_months: 120,
                approve_min_income: dec!(50000),
                approve_amount_to_income: dec!(4),
                approve_payment_to_income: dec!(0.35),
                review_min_income: dec!(30000),
                review_amount_to_income: dec!(5),
                review_payment_to_income: dec!(0.4),
            },
            general: CategoryThresholds {
                reject_amount_to_income: dec!(4),
                reject_payment_to_income: dec!(0.4),
                reject_term_months: 60,
                approve_min_income: dec!(20000),
                approve_amount_to_income: dec!(2.5),
                approve_payment_to_income: dec!(0.25),
                review_min_income: dec!(12000),
                review_amount_to_income: dec!(3),
                review_payment_to_income: dec!(0.3),
            },
        }
    }
}
