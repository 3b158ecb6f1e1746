use axum::{
    Json,
    extract::{Multipart, State},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::importer::{ImportReport, import_orders};
use crate::models::ImportResponse;
use crate::state::AppState;

// Errors reported verbatim are capped; the tail is summarized
const MAX_REPORTED_ERRORS: usize = 10;

pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("csv_file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        let report = import_orders(&state.store, &filename, &data)?;
        tracing::info!(
            created = report.created,
            errors = report.errors.len(),
            "csv import finished"
        );
        return Ok(Json(render_report(report)));
    }
    Err(AppError::MissingFile)
}

fn render_report(report: ImportReport) -> ImportResponse {
    let message =
        (report.created > 0).then(|| format!("Successfully created {} orders", report.created));
    let mut errors: Vec<String> = report
        .errors
        .iter()
        .take(MAX_REPORTED_ERRORS)
        .cloned()
        .collect();
    if report.errors.len() > MAX_REPORTED_ERRORS {
        errors.push(format!(
            "And {} more errors...",
            report.errors.len() - MAX_REPORTED_ERRORS
        ));
    }
    ImportResponse {
        created: report.created,
        message,
        errors,
    }
}
