use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier of the customer filing an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BankId(pub u32);

/// Identifier of a product as offered by one bank (rate and ranges are bank specific).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric input to the amortization engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Decimal,
    pub term_months: u32,
    /// Monthly rate as a fraction (0.02 is 2% per month).
    pub monthly_rate: Decimal,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl LoanRequest {
    pub fn start_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(today)
    }
}

/// One row of an amortization plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentLine {
    pub installment: u32,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub remaining_balance: Decimal,
    pub due_date: NaiveDate,
}

/// Product families with their own approval thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCategory {
    Housing,
    Personal,
    Vehicle,
    Commercial,
    General,
}

impl LoanCategory {
    pub const ALL: [LoanCategory; 5] = [
        LoanCategory::Housing,
        LoanCategory::Personal,
        LoanCategory::Vehicle,
        LoanCategory::Commercial,
        LoanCategory::General,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LoanCategory::Housing => "housing",
            LoanCategory::Personal => "personal",
            LoanCategory::Vehicle => "vehicle",
            LoanCategory::Commercial => "commercial",
            LoanCategory::General => "general",
        }
    }

    /// Lenient lookup used for free-form product names. Unknown names fall back to
    /// [`LoanCategory::General`] and are logged so misspelled catalog entries surface.
    pub fn resolve(name: &str) -> Self {
        match name.parse() {
            Ok(category) => category,
            Err(UnknownCategory(raw)) => {
                tracing::warn!(category = %raw, "unknown loan category, using general thresholds");
                LoanCategory::General
            }
        }
    }
}

impl fmt::Display for LoanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loan category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for LoanCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "housing" | "mortgage" | "konut" | "konut kredisi" => Ok(LoanCategory::Housing),
            "personal" | "general-need" | "general need" | "ihtiyac" | "ihtiyaç"
            | "ihtiyac kredisi" | "ihtiyaç kredisi" => Ok(LoanCategory::Personal),
            "vehicle" | "auto" | "car" | "tasit" | "taşıt" | "tasit kredisi"
            | "taşıt kredisi" | "araba kredisi" => Ok(LoanCategory::Vehicle),
            "commercial" | "business" | "ticari" | "ticari kredi" => Ok(LoanCategory::Commercial),
            "general" | "generic" | "other" => Ok(LoanCategory::General),
            _ => Err(UnknownCategory(value.to_string())),
        }
    }
}

/// Bank-specific bounds and pricing of a loan product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRange {
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub min_term: u32,
    pub max_term: u32,
    /// Monthly interest in percent (1.89 means 1.89% per month).
    pub interest_rate: Decimal,
    pub category: LoanCategory,
}

impl ProductRange {
    pub fn monthly_rate(&self) -> Decimal {
        self.interest_rate / Decimal::ONE_HUNDRED
    }

    pub fn contains_amount(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }

    pub fn contains_term(&self, term_months: u32) -> bool {
        term_months >= self.min_term && term_months <= self.max_term
    }
}

/// Outcome of the approval rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    UnderReview,
    Rejected,
}

impl Verdict {
    pub const fn label(self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::UnderReview => "under_review",
            Verdict::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failures raised by the calculation core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("out of range: {0}")]
    OutOfRange(String),
}

/// Round a monetary value to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn category_parsing_is_case_insensitive_and_accepts_aliases() {
        let aliases = [
            ("Housing", LoanCategory::Housing),
            ("KONUT KREDISI", LoanCategory::Housing),
            ("ihtiyaç kredisi", LoanCategory::Personal),
            (" general-need ", LoanCategory::Personal),
            ("Araba Kredisi", LoanCategory::Vehicle),
            ("ticari", LoanCategory::Commercial),
        ];
        for (raw, expected) in aliases {
            assert_eq!(raw.parse::<LoanCategory>().ok(), Some(expected), "{raw}");
        }
        assert!("housng".parse::<LoanCategory>().is_err());
    }

    #[test]
    fn resolve_falls_back_to_general() {
        assert_eq!(LoanCategory::resolve("education"), LoanCategory::General);
        assert_eq!(LoanCategory::resolve("vehicle"), LoanCategory::Vehicle);
    }

    #[test]
    fn round_money_rounds_halves_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.015)), dec!(1.02));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(2.004)), dec!(2.00));
    }

    #[test]
    fn product_range_bounds_are_inclusive() {
        let range = ProductRange {
            min_amount: dec!(10000),
            max_amount: dec!(50000),
            min_term: 6,
            max_term: 36,
            interest_rate: dec!(3.29),
            category: LoanCategory::Personal,
        };

        assert!(range.contains_amount(dec!(10000)));
        assert!(range.contains_amount(dec!(50000)));
        assert!(!range.contains_amount(dec!(50000.01)));
        assert!(range.contains_term(6));
        assert!(!range.contains_term(37));
        assert_eq!(range.monthly_rate(), dec!(0.0329));
    }
}
