use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::types::{MetalType, Product};
use crate::error::ApiError;

/// One CSV row of the bulk product import. `images` holds one or more
/// URLs separated by semicolons; `category` references an existing
/// category by name.
#[derive(Debug, Deserialize)]
struct ProductCsvRow {
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category: String,
    metal_type: String,
    images: String,
}

/// Per-row failure, reported back to the caller alongside the successes.
#[derive(Debug, serde::Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Outcome of a bulk import: partial success, never atomic.
#[derive(Debug, serde::Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<RowError>,
}

pub struct BulkImportUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> BulkImportUseCase<P, C> {
    /// Rows are processed strictly in order; a failing row is recorded
    /// and processing continues. Rows already imported stay imported —
    /// there is no rollback of prior rows.
    pub async fn execute(&self, csv_bytes: &[u8]) -> Result<ImportReport, ApiError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let mut report = ImportReport {
            imported: 0,
            errors: Vec::new(),
        };

        for (idx, result) in reader.deserialize::<ProductCsvRow>().enumerate() {
            // Row numbers are 1-based with the header on line 1.
            let row = idx + 2;
            match result {
                Err(e) => report.errors.push(RowError {
                    row,
                    message: e.to_string(),
                }),
                Ok(record) => match self.import_row(record).await {
                    Ok(()) => report.imported += 1,
                    Err(message) => report.errors.push(RowError { row, message }),
                },
            }
        }

        Ok(report)
    }

    async fn import_row(&self, row: ProductCsvRow) -> Result<(), String> {
        if row.name.trim().is_empty() {
            return Err("name must not be blank".into());
        }
        if row.price < Decimal::ZERO {
            return Err("price must be non-negative".into());
        }
        if row.stock < 0 {
            return Err("stock must be non-negative".into());
        }
        let metal_type = MetalType::from_str(&row.metal_type)
            .ok_or_else(|| format!("unknown metal type \"{}\"", row.metal_type))?;
        let images: Vec<String> = row
            .images
            .split(';')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect();
        if images.is_empty() {
            return Err("at least one image url required".into());
        }

        let category = self
            .categories
            .find_by_name(&row.category)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("unknown category \"{}\"", row.category))?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: category.id,
            metal_type,
            images,
            ratings_average: Decimal::ZERO,
            ratings_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.products
            .create(&product)
            .await
            .map_err(|e| e.to_string())
    }
}
