use serde::Deserialize;
use thiserror::Error;

use crate::store::Store;

// One parsed CSV line. Missing columns deserialize to empty strings so row
// validation can report them uniformly.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(default)]
    delivery_address: String,
    #[serde(default)]
    promocode: String,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    product_ids: String,
}

// Failures that reject the whole upload before any row is processed
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file must have a .csv extension")]
    Extension,

    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

// Outcome of a single row. An order whose products only partially resolved
// still counts as created; the warnings ride along instead of failing the row.
enum RowOutcome {
    Created,
    CreatedWithWarnings(Vec<String>),
    Skipped(String),
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: usize,
    pub errors: Vec<String>,
}

// Imports orders from an uploaded CSV with columns
// delivery_address,promocode,user_id,product_ids. Rows fail independently:
// one bad row records an error and the batch keeps going.
pub fn import_orders(
    store: &Store,
    filename: &str,
    data: &[u8],
) -> Result<ImportReport, ImportError> {
    if !filename.ends_with(".csv") {
        return Err(ImportError::Extension);
    }
    let text = std::str::from_utf8(data)?;

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut report = ImportReport::default();

    // The header is row 1, so data rows are numbered from 2 in every message
    for (i, record) in reader.deserialize::<ImportRow>().enumerate() {
        let row_num = i + 2;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                report.errors.push(format!("Row {row_num}: error - {e}"));
                continue;
            }
        };
        match process_row(store, row_num, &row) {
            RowOutcome::Created => report.created += 1,
            RowOutcome::CreatedWithWarnings(mut warnings) => {
                report.created += 1;
                report.errors.append(&mut warnings);
            }
            RowOutcome::Skipped(reason) => report.errors.push(reason),
        }
    }

    Ok(report)
}

fn process_row(store: &Store, row_num: usize, row: &ImportRow) -> RowOutcome {
    let delivery_address = row.delivery_address.trim();
    let promocode = row.promocode.trim();
    let user_id = row.user_id.trim();
    let product_ids = row.product_ids.trim();

    if delivery_address.is_empty() || user_id.is_empty() {
        return RowOutcome::Skipped(format!(
            "Row {row_num}: missing delivery address or user id"
        ));
    }

    let user = match user_id.parse::<i64>().ok().and_then(|id| store.user(id)) {
        Some(user) => user,
        None => {
            return RowOutcome::Skipped(format!(
                "Row {row_num}: user with id {user_id} not found"
            ));
        }
    };

    // The order is written before products resolve; unmatched products leave a
    // warning behind but never undo the order.
    let order = store.create_order(delivery_address, promocode, user.id);

    let mut warnings = Vec::new();
    if !product_ids.is_empty() {
        match parse_id_list(product_ids) {
            Ok(requested) => {
                let found = store.existing_product_ids(&requested);
                store.set_order_products(order.id, found.clone());
                if found.len() != requested.len() {
                    let missing: Vec<i64> = requested
                        .iter()
                        .copied()
                        .filter(|id| !found.contains(id))
                        .collect();
                    warnings.push(format!(
                        "Row {row_num}: products with ids {missing:?} not found"
                    ));
                }
            }
            Err(_) => {
                warnings.push(format!("Row {row_num}: invalid product id format"));
            }
        }
    }

    if warnings.is_empty() {
        RowOutcome::Created
    } else {
        RowOutcome::CreatedWithWarnings(warnings)
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',')
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.parse::<i64>())
        .collect()
}
