use chrono::NaiveDate;
use loan_desk::config::{ConfigError, LendingConfig};
use loan_desk::lending::{
    ApplicationId, ApplicationRecord, ApplicationRepository, CatalogSnapshot, CustomerId,
    RepositoryError, Verdict,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Products served when no `APP_CATALOG_CSV` is configured.
pub(crate) const SEED_CATALOG_CSV: &str = "\
bank_id,bank_name,logo_url,product_id,product_name,category,interest_rate,min_amount,max_amount,min_term,max_term,active
1,Anadolu Bank,,101,İhtiyaç Kredisi,personal,3.49,5000,350000,3,36,true
1,Anadolu Bank,,102,Taşıt Kredisi,vehicle,3.05,50000,1500000,6,48,true
1,Anadolu Bank,,103,Konut Kredisi,housing,2.79,100000,5000000,12,240,true
2,Boğaziçi Finans,,201,İhtiyaç Kredisi,personal,3.59,10000,250000,3,36,true
2,Boğaziçi Finans,,202,Ticari Kredi,commercial,3.15,50000,10000000,6,120,true
2,Boğaziçi Finans,,203,Eğitim Kredisi,general,2.99,5000,100000,6,48,false
3,Karadeniz Katılım,,301,Konut Kredisi,housing,2.69,150000,7500000,24,180,true
3,Karadeniz Katılım,,302,Taşıt Kredisi,vehicle,3.19,40000,1000000,6,36,true
";

pub(crate) fn seed_catalog() -> Result<CatalogSnapshot, ConfigError> {
    CatalogSnapshot::from_reader(Cursor::new(SEED_CATALOG_CSV)).map_err(|source| {
        ConfigError::Catalog {
            path: PathBuf::from("<seed catalog>"),
            source,
        }
    })
}

/// Configured catalog file, or the seed catalog when none is set.
pub(crate) fn load_catalog(config: &LendingConfig) -> Result<CatalogSnapshot, ConfigError> {
    match config.catalog()? {
        Some(catalog) => Ok(catalog),
        None => seed_catalog(),
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl InMemoryApplicationRepository {
    fn guard(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ApplicationId, ApplicationRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard.get(id).cloned())
    }

    fn for_customer(
        &self,
        customer: &CustomerId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard
            .values()
            .filter(|record| record.customer_id.as_ref() == Some(customer))
            .cloned()
            .collect())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.guard()?;
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

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as a decimal ({err})"))
}
