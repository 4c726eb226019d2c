//! Fixed-payment (annuity) amortization schedules.
//!
//! Balances are carried at full decimal precision between installments; only the
//! values written to each [`InstallmentLine`] are rounded to cents. Summing the
//! rounded lines can therefore drift from `principal + interest` by a few cents,
//! which is accepted rather than reconciled on the final line.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use super::domain::{round_money, InstallmentLine, LendingError, LoanRequest};

/// Compute the installment plan for `principal` repaid over `term_months` at
/// `monthly_rate` (a fraction, not a percentage). Line `i` falls due `i` months
/// after `start_date`.
pub fn compute_schedule(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
    start_date: NaiveDate,
) -> Result<Vec<InstallmentLine>, LendingError> {
    if term_months == 0 {
        return Err(LendingError::InvalidArgument(
            "term must be at least one month".to_string(),
        ));
    }
    if principal <= Decimal::ZERO {
        return Err(LendingError::InvalidArgument(format!(
            "principal must be positive, got {principal}"
        )));
    }
    if monthly_rate < Decimal::ZERO {
        return Err(LendingError::InvalidArgument(format!(
            "monthly rate cannot be negative, got {monthly_rate}"
        )));
    }

    let payment = fixed_installment(principal, monthly_rate, term_months)?;
    // Totals are summed from the lines, so they must fit as well.
    payment
        .checked_mul(Decimal::from(term_months))
        .ok_or_else(|| beyond_decimal_range("total payment"))?;

    let mut balance = principal;
    let mut lines = Vec::with_capacity(term_months as usize);

    for installment in 1..=term_months {
        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| beyond_decimal_range("interest"))?;
        let principal_part = payment
            .checked_sub(interest)
            .ok_or_else(|| beyond_decimal_range("principal portion"))?;
        balance = balance
            .checked_sub(principal_part)
            .ok_or_else(|| beyond_decimal_range("remaining balance"))?
            .max(Decimal::ZERO);

        let due_date = start_date
            .checked_add_months(Months::new(installment))
            .ok_or_else(|| {
                LendingError::InvalidArgument(format!(
                    "due date of installment {installment} is outside the supported calendar"
                ))
            })?;

        lines.push(InstallmentLine {
            installment,
            payment: round_money(payment),
            principal: round_money(principal_part),
            interest: round_money(interest),
            remaining_balance: round_money(balance),
            due_date,
        });
    }

    Ok(lines)
}

/// Schedule for a [`LoanRequest`], starting on `today` when the request carries no date.
pub fn schedule_for(
    request: &LoanRequest,
    today: NaiveDate,
) -> Result<Vec<InstallmentLine>, LendingError> {
    compute_schedule(
        request.principal,
        request.monthly_rate,
        request.term_months,
        request.start_date_or(today),
    )
}

fn fixed_installment(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<Decimal, LendingError> {
    let straight_line = principal / Decimal::from(term_months);
    if monthly_rate.is_zero() {
        return Ok(straight_line);
    }

    let base = Decimal::ONE
        .checked_add(monthly_rate)
        .ok_or_else(|| beyond_decimal_range("monthly rate"))?;
    // (1+r)^-n; past the decimal range the discount term is indistinguishable from 0.
    let discount = match base.checked_powi(i64::from(term_months)) {
        Some(growth) if !growth.is_zero() => Decimal::ONE / growth,
        _ => Decimal::ZERO,
    };
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Ok(straight_line);
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| beyond_decimal_range("installment"))
}

fn beyond_decimal_range(what: &str) -> LendingError {
    LendingError::InvalidArgument(format!("{what} exceeds the supported decimal range"))
}

/// Aggregate figures shown next to a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub installments: u32,
    pub monthly_payment: Decimal,
    pub total_payment: Decimal,
    pub total_interest: Decimal,
}

impl ScheduleSummary {
    /// Monthly payment is the first line's installment; totals are sums of the
    /// already-rounded lines.
    pub fn from_lines(lines: &[InstallmentLine]) -> Self {
        let monthly_payment = lines
            .first()
            .map(|line| line.payment)
            .unwrap_or(Decimal::ZERO);

        Self {
            installments: lines.len() as u32,
            monthly_payment,
            total_payment: lines.iter().map(|line| line.payment).sum(),
            total_interest: lines.iter().map(|line| line.interest).sum(),
        }
    }
}
