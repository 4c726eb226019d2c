//! Banks and the loan products they offer.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{BankId, LoanCategory, ProductId, ProductRange, UnknownCategory};
use super::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub id: BankId,
    pub name: String,
    pub logo_url: Option<String>,
    pub active: bool,
}

/// A product as priced and bounded by one bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankProduct {
    pub id: ProductId,
    pub bank_id: BankId,
    pub bank_name: String,
    pub product_name: String,
    pub range: ProductRange,
    pub active: bool,
}

/// Read access to reference data. Lookups only ever return active entries.
pub trait ProductCatalog: Send + Sync {
    fn banks(&self) -> Result<Vec<Bank>, RepositoryError>;
    fn products_for_bank(&self, bank_id: BankId) -> Result<Vec<BankProduct>, RepositoryError>;
    fn product(&self, id: ProductId) -> Result<Option<BankProduct>, RepositoryError>;
    /// Active products of active banks, ordered by bank name then product name.
    fn active_products(&self) -> Result<Vec<BankProduct>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("product {product}: {source}")]
    UnknownCategory {
        product: ProductId,
        source: UnknownCategory,
    },
    #[error("product {product}: '{value}' is not a valid {field}")]
    InvalidNumber {
        product: ProductId,
        field: &'static str,
        value: String,
    },
    #[error("product {product}: minimum {field} exceeds maximum")]
    InvalidRange {
        product: ProductId,
        field: &'static str,
    },
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
}

/// In-memory catalog, typically loaded once from a CSV export at startup.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    banks: BTreeMap<BankId, Bank>,
    products: BTreeMap<ProductId, BankProduct>,
}

impl CatalogSnapshot {
    pub fn new(banks: Vec<Bank>, products: Vec<BankProduct>) -> Self {
        Self {
            banks: banks.into_iter().map(|bank| (bank.id, bank)).collect(),
            products: products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Columns: `bank_id,bank_name,logo_url,product_id,product_name,category,
    /// interest_rate,min_amount,max_amount,min_term,max_term,active`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut snapshot = Self::default();

        for row in csv_reader.deserialize::<CatalogRow>() {
            let row = row?;
            let product = row.to_product()?;
            if snapshot.products.contains_key(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }

            snapshot
                .banks
                .entry(product.bank_id)
                .or_insert_with(|| Bank {
                    id: product.bank_id,
                    name: row.bank_name.clone(),
                    logo_url: row.logo_url.clone(),
                    active: true,
                });
            snapshot.products.insert(product.id, product);
        }

        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn bank_is_active(&self, bank_id: BankId) -> bool {
        self.banks
            .get(&bank_id)
            .map(|bank| bank.active)
            .unwrap_or(false)
    }
}

impl ProductCatalog for CatalogSnapshot {
    fn banks(&self) -> Result<Vec<Bank>, RepositoryError> {
        let mut banks: Vec<Bank> = self
            .banks
            .values()
            .filter(|bank| bank.active)
            .cloned()
            .collect();
        banks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(banks)
    }

    fn products_for_bank(&self, bank_id: BankId) -> Result<Vec<BankProduct>, RepositoryError> {
        Ok(self
            .products
            .values()
            .filter(|product| {
                product.bank_id == bank_id && product.active && self.bank_is_active(bank_id)
            })
            .cloned()
            .collect())
    }

    fn product(&self, id: ProductId) -> Result<Option<BankProduct>, RepositoryError> {
        Ok(self
            .products
            .get(&id)
            .filter(|product| product.active && self.bank_is_active(product.bank_id))
            .cloned())
    }

    fn active_products(&self) -> Result<Vec<BankProduct>, RepositoryError> {
        let mut products: Vec<BankProduct> = self
            .products
            .values()
            .filter(|product| product.active && self.bank_is_active(product.bank_id))
            .cloned()
            .collect();
        products.sort_by(|a, b| {
            a.bank_name
                .cmp(&b.bank_name)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        Ok(products)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    bank_id: u32,
    bank_name: String,
    #[serde(default)]
    logo_url: Option<String>,
    product_id: u32,
    product_name: String,
    category: String,
    interest_rate: String,
    min_amount: String,
    max_amount: String,
    min_term: u32,
    max_term: u32,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl CatalogRow {
    fn to_product(&self) -> Result<BankProduct, CatalogError> {
        let product = ProductId(self.product_id);
        let category = LoanCategory::from_str(&self.category)
            .map_err(|source| CatalogError::UnknownCategory { product, source })?;
        let interest_rate = parse_decimal(product, "interest rate", &self.interest_rate)?;
        let min_amount = parse_decimal(product, "minimum amount", &self.min_amount)?;
        let max_amount = parse_decimal(product, "maximum amount", &self.max_amount)?;

        if min_amount > max_amount {
            return Err(CatalogError::InvalidRange {
                product,
                field: "amount",
            });
        }
        if self.min_term > self.max_term {
            return Err(CatalogError::InvalidRange {
                product,
                field: "term",
            });
        }

        Ok(BankProduct {
            id: product,
            bank_id: BankId(self.bank_id),
            bank_name: self.bank_name.clone(),
            product_name: self.product_name.clone(),
            range: ProductRange {
                min_amount,
                max_amount,
                min_term: self.min_term,
                max_term: self.max_term,
                interest_rate,
                category,
            },
            active: self.active,
        })
    }
}

fn parse_decimal(
    product: ProductId,
    field: &'static str,
    raw: &str,
) -> Result<Decimal, CatalogError> {
    Decimal::from_str(raw).map_err(|_| CatalogError::InvalidNumber {
        product,
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const CATALOG: &str = "\
bank_id,bank_name,logo_url,product_id,product_name,category,interest_rate,min_amount,max_amount,min_term,max_term,active
2,Zeta Bank,,21,Konut Kredisi,housing,2.79,100000,5000000,12,240,true
1,Alfa Bank,https://cdn.example/alfa.png,11,Taşıt Kredisi,vehicle,3.05,50000,1500000,6,48,true
1,Alfa Bank,https://cdn.example/alfa.png,10,İhtiyaç Kredisi,personal,3.49,5000,350000,3,36,true
1,Alfa Bank,https://cdn.example/alfa.png,12,Ticari Kredi,commercial,3.15,50000,10000000,6,60,false
";

    #[test]
    fn active_products_are_sorted_by_bank_then_product() {
        let catalog = CatalogSnapshot::from_reader(Cursor::new(CATALOG)).expect("catalog loads");

        let names: Vec<(String, String)> = catalog
            .active_products()
            .expect("listing succeeds")
            .into_iter()
            .map(|product| (product.bank_name, product.product_name))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Alfa Bank".to_string(), "Taşıt Kredisi".to_string()),
                ("Alfa Bank".to_string(), "İhtiyaç Kredisi".to_string()),
                ("Zeta Bank".to_string(), "Konut Kredisi".to_string()),
            ]
        );
    }

    #[test]
    fn inactive_products_are_hidden_from_lookups() {
        let catalog = CatalogSnapshot::from_reader(Cursor::new(CATALOG)).expect("catalog loads");

        assert!(catalog.product(ProductId(12)).expect("lookup").is_none());
        assert_eq!(catalog.products_for_bank(BankId(1)).expect("lookup").len(), 2);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn products_of_inactive_banks_are_hidden_from_lookups() {
        let bank = Bank {
            id: BankId(1),
            name: "Alfa Bank".to_string(),
            logo_url: None,
            active: false,
        };
        let product = BankProduct {
            id: ProductId(7),
            bank_id: BankId(1),
            bank_name: "Alfa Bank".to_string(),
            product_name: "İhtiyaç Kredisi".to_string(),
            range: ProductRange {
                min_amount: dec!(5000),
                max_amount: dec!(350000),
                min_term: 3,
                max_term: 36,
                interest_rate: dec!(3.49),
                category: LoanCategory::Personal,
            },
            active: true,
        };
        let catalog = CatalogSnapshot::new(vec![bank], vec![product]);

        assert!(catalog.banks().expect("banks").is_empty());
        assert!(catalog.active_products().expect("products").is_empty());
        assert!(catalog.product(ProductId(7)).expect("lookup").is_none());
        assert!(catalog
            .products_for_bank(BankId(1))
            .expect("lookup")
            .is_empty());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn rows_are_parsed_into_typed_ranges() {
        let catalog = CatalogSnapshot::from_reader(Cursor::new(CATALOG)).expect("catalog loads");
        let product = catalog
            .product(ProductId(21))
            .expect("lookup")
            .expect("product present");

        assert_eq!(product.range.category, LoanCategory::Housing);
        assert_eq!(product.range.interest_rate, dec!(2.79));
        assert_eq!(product.range.max_amount, dec!(5000000));
        assert_eq!(product.range.max_term, 240);

        let banks = catalog.banks().expect("banks");
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "Alfa Bank");
        assert_eq!(
            banks[0].logo_url.as_deref(),
            Some("https://cdn.example/alfa.png")
        );
        assert!(banks[1].logo_url.is_none());
    }

    #[test]
    fn rejects_unknown_categories_and_inverted_ranges() {
        let unknown = "bank_id,bank_name,logo_url,product_id,product_name,category,interest_rate,min_amount,max_amount,min_term,max_term,active\n\
1,Alfa Bank,,10,Education,educaton,2.5,1000,2000,3,12,true\n";
        assert!(matches!(
            CatalogSnapshot::from_reader(Cursor::new(unknown)),
            Err(CatalogError::UnknownCategory { .. })
        ));

        let inverted = "bank_id,bank_name,logo_url,product_id,product_name,category,interest_rate,min_amount,max_amount,min_term,max_term,active\n\
1,Alfa Bank,,10,Personal,personal,2.5,3000,2000,3,12,true\n";
        assert!(matches!(
            CatalogSnapshot::from_reader(Cursor::new(inverted)),
            Err(CatalogError::InvalidRange { field: "amount", .. })
        ));

        let duplicate = "bank_id,bank_name,logo_url,product_id,product_name,category,interest_rate,min_amount,max_amount,min_term,max_term,active\n\
1,Alfa Bank,,10,Personal,personal,2.5,1000,2000,3,12,true\n\
1,Alfa Bank,,10,Personal,personal,2.5,1000,2000,3,12,true\n";
        assert!(matches!(
            CatalogSnapshot::from_reader(Cursor::new(duplicate)),
            Err(CatalogError::DuplicateProduct(ProductId(10)))
        ));
    }
}
