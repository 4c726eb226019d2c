use crate::infra::{load_catalog, parse_date, parse_decimal, InMemoryApplicationRepository};
use chrono::{NaiveDate, Utc};
use clap::Args;
use loan_desk::config::{AppConfig, LendingConfig};
use loan_desk::error::AppError;
use loan_desk::lending::{
    ApplicationSubmission, BankId, BankProduct, CatalogSnapshot, CustomerId, InstallmentLine,
    LoanApplicationService, ProductCatalog, ProductId, QuoteRequest, ScheduleSummary, Verdict,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Amount borrowed
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) principal: Decimal,
    /// Monthly interest rate in percent (1.89 means 1.89% per month)
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) rate: Decimal,
    /// Number of monthly installments
    #[arg(long)]
    pub(crate) term: u32,
    /// Schedule start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogListArgs {
    /// Only list products of this bank
    #[arg(long)]
    pub(crate) bank_id: Option<u32>,
    /// Catalog CSV to read instead of the configured one
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Start date used for every schedule in the demo (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Catalog CSV to read instead of the built-in products
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
}

type DemoService = LoanApplicationService<InMemoryApplicationRepository, CatalogSnapshot>;

fn build_service(catalog_csv: Option<PathBuf>) -> Result<DemoService, AppError> {
    let mut lending = AppConfig::load()?.lending;
    if catalog_csv.is_some() {
        lending.catalog_path = catalog_csv;
    }
    build_service_from(&lending)
}

fn build_service_from(lending: &LendingConfig) -> Result<DemoService, AppError> {
    let catalog = load_catalog(lending)?;
    let service = LoanApplicationService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(catalog),
        lending.approval_config()?,
    )
    .with_max_quote_term(lending.max_quote_term);
    Ok(service)
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let service = build_service(None)?;
    let quote = service.quote(QuoteRequest {
        principal: args.principal,
        term_months: args.term,
        interest_rate: args.rate,
        product_id: None,
        start_date: args.start,
    })?;

    println!(
        "Loan of {} over {} months at {}% per month",
        quote.principal, quote.term_months, quote.interest_rate
    );
    render_schedule(&quote.schedule);
    render_summary(&quote.summary);
    Ok(())
}

pub(crate) fn run_catalog_list(args: CatalogListArgs) -> Result<(), AppError> {
    let service = build_service(args.catalog_csv)?;
    let catalog = service.catalog();
    let products = match args.bank_id {
        Some(bank_id) => catalog.products_for_bank(BankId(bank_id)),
        None => catalog.active_products(),
    }
    .map_err(|err| AppError::Lending(err.into()))?;

    if products.is_empty() {
        println!("No active products");
        return Ok(());
    }
    for product in &products {
        println!("{}", product_row(product));
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(|| Utc::now().date_naive());
    let service = build_service(args.catalog_csv)?;

    println!("Loan desk demo");
    println!("\nProduct catalog");
    let products = service
        .catalog()
        .active_products()
        .map_err(|err| AppError::Lending(err.into()))?;
    for product in &products {
        println!("- {}", product_row(product));
    }

    let Some(showcase) = products
        .iter()
        .find(|product| product.range.contains_amount(Decimal::from(30_000)))
    else {
        println!("\nNo product accepts the sample amount; skipping quote and applications");
        return Ok(());
    };

    let term = showcase.range.max_term.min(36);
    println!(
        "\nQuote: 30000 over {term} months with {} / {}",
        showcase.bank_name, showcase.product_name
    );
    let quote = service.quote(QuoteRequest {
        principal: Decimal::from(30_000),
        term_months: term,
        interest_rate: Decimal::ZERO,
        product_id: Some(showcase.id),
        start_date: Some(start),
    })?;
    render_schedule(&quote.schedule);
    render_summary(&quote.summary);

    println!("\nSample applications");
    let samples = [
        ("cust-demo-1", "steady salary", Decimal::from(30_000), Decimal::from(25_000)),
        ("cust-demo-2", "stretched budget", Decimal::from(55_000), Decimal::from(25_000)),
        ("cust-demo-3", "income below floor", Decimal::from(20_000), Decimal::from(4_500)),
    ];

    let mut referred = Vec::new();
    for (customer, label, amount, income) in samples {
        let submission = sample_submission(customer, showcase.id, amount, term, income, start);
        match service.apply(submission) {
            Ok(record) => {
                println!(
                    "- {} ({label}): {} -> {} [{}]",
                    record.id,
                    record.requested_amount,
                    record.verdict,
                    record.decision_rationale()
                );
                if record.verdict == Verdict::UnderReview {
                    referred.push(record.id);
                }
            }
            Err(err) => println!("- {customer} ({label}): not accepted: {err}"),
        }
    }

    for id in referred {
        let record = service.approve(&id)?;
        println!(
            "\nOfficer override on {}: {} [{}]",
            record.id,
            record.verdict,
            record.decision_rationale()
        );
    }

    Ok(())
}

fn sample_submission(
    customer: &str,
    product_id: ProductId,
    amount: Decimal,
    term_months: u32,
    income: Decimal,
    start: NaiveDate,
) -> ApplicationSubmission {
    ApplicationSubmission {
        customer_id: Some(CustomerId(customer.to_string())),
        applicant_name: None,
        email: None,
        product_id,
        amount,
        term_months,
        income,
        start_date: Some(start),
    }
}

fn product_row(product: &BankProduct) -> String {
    format!(
        "#{} {} / {} ({}): {}% monthly, {}-{} over {}-{} months",
        product.id,
        product.bank_name,
        product.product_name,
        product.range.category,
        product.range.interest_rate,
        product.range.min_amount,
        product.range.max_amount,
        product.range.min_term,
        product.range.max_term
    )
}

fn schedule_rows(lines: &[InstallmentLine]) -> Vec<String> {
    let mut rows = vec![format!(
        "{:>4}  {:<10}  {:>12}  {:>12}  {:>12}  {:>14}",
        "#", "due", "payment", "principal", "interest", "balance"
    )];
    rows.extend(lines.iter().map(|line| {
        format!(
            "{:>4}  {:<10}  {:>12}  {:>12}  {:>12}  {:>14}",
            line.installment,
            line.due_date.to_string(),
            line.payment.to_string(),
            line.principal.to_string(),
            line.interest.to_string(),
            line.remaining_balance.to_string()
        )
    }));
    rows
}

fn render_schedule(lines: &[InstallmentLine]) {
    for row in schedule_rows(lines) {
        println!("{row}");
    }
}

fn render_summary(summary: &ScheduleSummary) {
    println!(
        "Monthly payment {} | total payment {} | total interest {} | {} installments",
        summary.monthly_payment,
        summary.total_payment,
        summary.total_interest,
        summary.installments
    );
}
