//! Request handlers.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use webpify_core::{ImageInput, SERVICE_NAME, VERSION};

use super::{ApiError, AppState};

/// Multipart field carrying uploaded images.
const FILES_FIELD: &str = "files";
/// Multipart field carrying the requested quality.
const QUALITY_FIELD: &str = "quality";

#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    quality: Option<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": VERSION,
        "description": "Convert images to WebP. One upload returns a .webp, several return a ZIP.",
        "endpoints": {
            "health": "GET /api/health",
            "convert": "POST /api/convert (multipart: files, quality)",
        },
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": VERSION,
    }))
}

/// Convert uploaded images.
///
/// A `quality` form field takes precedence over the `?quality=` query
/// parameter; without either the configured default applies.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConvertQuery>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut inputs = Vec::new();
    let mut form_quality = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILES_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                tracing::debug!("Received {:?} ({} bytes)", filename, bytes.len());
                inputs.push(ImageInput::new(bytes.to_vec(), filename));
            }
            QUALITY_FIELD => form_quality = Some(field.text().await?),
            other => tracing::debug!("Ignoring form field {:?}", other),
        }
    }

    let quality = match form_quality.or(query.quality) {
        Some(raw) => parse_quality(&raw)?,
        None => i32::from(state.default_quality),
    };

    let count = inputs.len();
    let conversion = state.converter.convert_all(inputs, quality);
    let outcome = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, conversion)
            .await
            .map_err(|_| ApiError::Timeout)??,
        None => conversion.await?,
    };

    tracing::info!(
        "Converted {} file(s) at quality {} into {}",
        count,
        quality,
        outcome.filename()
    );

    let content_type = outcome.content_type();
    let (filename, bytes) = outcome.into_parts();
    let disposition = format!("attachment; filename=\"{}\"", header_safe(&filename));

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn parse_quality(raw: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(q) if (1..=100).contains(&q) => Ok(q),
        _ => Err(ApiError::InvalidQuality(raw.to_string())),
    }
}

/// Make a filename safe to embed in a quoted header parameter.
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
