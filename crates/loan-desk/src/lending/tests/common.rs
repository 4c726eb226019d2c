use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::lending::catalog::CatalogSnapshot;
use crate::lending::domain::{ApplicationId, CustomerId, ProductId, Verdict};
use crate::lending::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};
use crate::lending::service::{ApplicationSubmission, LoanApplicationService};
use crate::lending::{lending_router, ApprovalConfig};

pub(super) const PERSONAL: ProductId = ProductId(10);
pub(super) const VEHICLE: ProductId = ProductId(11);
pub(super) const RETIRED_COMMERCIAL: ProductId = ProductId(12);
pub(super) const HOUSING: ProductId = ProductId(21);

pub(super) const CATALOG_CSV: &str = "\
bank_id,bank_name,logo_url,product_id,product_name,category,interest_rate,min_amount,max_amount,min_term,max_term,active
1,Alfa Bank,,10,İhtiyaç Kredisi,personal,3.49,5000,350000,3,36,true
1,Alfa Bank,,11,Taşıt Kredisi,vehicle,3.05,50000,1500000,6,48,true
1,Alfa Bank,,12,Ticari Kredi,commercial,3.15,50000,10000000,6,60,false
2,Zeta Bank,,21,Konut Kredisi,housing,2.79,100000,5000000,12,240,true
";

pub(super) fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date")
}

pub(super) fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::from_reader(Cursor::new(CATALOG_CSV)).expect("fixture catalog parses")
}

pub(super) fn submission(customer: &str, product_id: ProductId) -> ApplicationSubmission {
    ApplicationSubmission {
        customer_id: Some(CustomerId(customer.to_string())),
        applicant_name: Some("Deniz Aksoy".to_string()),
        email: Some("deniz@example.com".to_string()),
        product_id,
        amount: dec!(30000),
        term_months: 36,
        income: dec!(25000),
        start_date: Some(start_date()),
    }
}

pub(super) fn submission_with(
    customer: &str,
    product_id: ProductId,
    amount: Decimal,
    term_months: u32,
    income: Decimal,
) -> ApplicationSubmission {
    ApplicationSubmission {
        amount,
        term_months,
        income,
        ..submission(customer, product_id)
    }
}

pub(super) fn build_service() -> (
    LoanApplicationService<MemoryRepository, CatalogSnapshot>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanApplicationService::new(
        repository.clone(),
        Arc::new(catalog()),
        ApprovalConfig::default(),
    );
    (service, repository)
}

pub(super) fn router_with_service(
    service: LoanApplicationService<MemoryRepository, CatalogSnapshot>,
) -> axum::Router {
    lending_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_customer(
        &self,
        customer: &CustomerId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.customer_id.as_ref() == Some(customer))
            .cloned()
            .collect())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut pending: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.verdict == Verdict::UnderReview)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        pending.truncate(limit);
        Ok(pending)
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_customer(
        &self,
        _customer: &CustomerId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
