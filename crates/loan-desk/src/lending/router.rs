use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::ProductCatalog;
use super::domain::{ApplicationId, BankId, CustomerId, LendingError, ProductId};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{
    ApplicationSubmission, LoanApplicationService, LoanServiceError, QuoteRequest,
};

type SharedService<R, C> = Arc<LoanApplicationService<R, C>>;

/// Router exposing quotes, the product catalog and the application lifecycle.
pub fn lending_router<R, C>(service: SharedService<R, C>) -> Router
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    Router::new()
        .route("/api/v1/loans/quote", post(quote_handler::<R, C>))
        .route("/api/v1/banks", get(banks_handler::<R, C>))
        .route(
            "/api/v1/banks/:bank_id/products",
            get(bank_products_handler::<R, C>),
        )
        .route("/api/v1/products", get(products_handler::<R, C>))
        .route(
            "/api/v1/products/:product_id",
            get(product_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/applications",
            post(submit_handler::<R, C>),
        )
        .route("/api/v1/loans/pending", get(pending_handler::<R, C>))
        .route(
            "/api/v1/loans/applications/:application_id",
            get(application_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/applications/:application_id/approve",
            post(approve_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/applications/:application_id/reject",
            post(reject_handler::<R, C>),
        )
        .route(
            "/api/v1/customers/:customer_id/applications",
            get(customer_applications_handler::<R, C>),
        )
        .with_state(service)
}

pub(crate) const DEFAULT_PENDING_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub(crate) struct PendingQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    reason: String,
}

pub(crate) async fn quote_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Json(request): Json<QuoteRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.quote(request) {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn banks_handler<R, C>(State(service): State<SharedService<R, C>>) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.catalog().banks() {
        Ok(banks) => (StatusCode::OK, Json(banks)).into_response(),
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn bank_products_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(bank_id): Path<u32>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.catalog().products_for_bank(BankId(bank_id)) {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn products_handler<R, C>(
    State(service): State<SharedService<R, C>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.catalog().active_products() {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn product_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(product_id): Path<u32>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    let id = ProductId(product_id);
    match service.catalog().product(id) {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => error_response(LoanServiceError::ProductNotFound(id)),
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn submit_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.apply(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Review queue, oldest submission first.
pub(crate) async fn pending_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Query(query): Query<PendingQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_PENDING_LIMIT);
    match service.pending(limit) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.approve(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(application_id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    let reason = body
        .map(|Json(request)| request.reason)
        .unwrap_or_default();
    match service.reject(&ApplicationId(application_id), &reason) {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn customer_applications_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(customer_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: ProductCatalog + 'static,
{
    match service.customer_applications(&CustomerId(customer_id)) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn status_for(error: &LoanServiceError) -> StatusCode {
    match error {
        LoanServiceError::Lending(LendingError::InvalidArgument(_))
        | LoanServiceError::Lending(LendingError::OutOfRange(_)) => StatusCode::BAD_REQUEST,
        LoanServiceError::ProductNotFound(_)
        | LoanServiceError::ApplicationNotFound(_)
        | LoanServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LoanServiceError::DuplicateApplication { .. }
        | LoanServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LoanServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: LoanServiceError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "lending request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
