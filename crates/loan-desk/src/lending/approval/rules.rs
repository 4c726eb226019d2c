use rust_decimal::Decimal;

use super::config::CategoryThresholds;
use super::policy::DecisionRule;

pub(crate) struct ApprovalSignals {
    pub income: Decimal,
    pub amount_to_income: Decimal,
    pub payment_to_income: Decimal,
    pub term_months: u32,
}

pub(crate) fn derive_signals(
    income: Decimal,
    requested_amount: Decimal,
    term_months: u32,
    monthly_payment: Decimal,
) -> ApprovalSignals {
    ApprovalSignals {
        income,
        amount_to_income: ratio(requested_amount, income),
        payment_to_income: ratio(monthly_payment, income),
        term_months,
    }
}

// Zero or negative income yields a 0 ratio instead of a division error.
fn ratio(numerator: Decimal, income: Decimal) -> Decimal {
    if income > Decimal::ZERO {
        numerator.checked_div(income).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

/// Walk the reject, approve and review tiers of one category in order.
pub(crate) fn evaluate_tiers(
    signals: &ApprovalSignals,
    thresholds: &CategoryThresholds,
) -> DecisionRule {
    if signals.amount_to_income > thresholds.reject_amount_to_income {
        return DecisionRule::AmountCeiling;
    }
    if signals.payment_to_income > thresholds.reject_payment_to_income {
        return DecisionRule::PaymentCeiling;
    }
    if signals.term_months > thresholds.reject_term_months {
        return DecisionRule::TermCeiling;
    }

    if signals.income >= thresholds.approve_min_income
        && signals.amount_to_income <= thresholds.approve_amount_to_income
        && signals.payment_to_income <= thresholds.approve_payment_to_income
    {
        return DecisionRule::ApproveBand;
    }

    if signals.income >= thresholds.review_min_income
        && signals.amount_to_income <= thresholds.review_amount_to_income
        && signals.payment_to_income <= thresholds.review_payment_to_income
    {
        return DecisionRule::ReviewBand;
    }

    DecisionRule::Fallthrough
}
