//! Upload analysis endpoint.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::signals::{analyze_csv, analyze_image};
use crate::types::{Signal, SignalDetails, Timeframe};
use crate::AppState;

/// Accepted upload extensions.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "csv"];

/// How an upload is analyzed, decided by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Csv,
    Image,
}

impl UploadKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "csv" => Some(UploadKind::Csv),
            "jpg" | "jpeg" | "png" => Some(UploadKind::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: String,
    pub signal: Signal,
    pub caption: String,
    pub file_processed: String,
    pub user_id: Option<String>,
}

/// Fields collected from the multipart form.
#[derive(Default)]
struct AnalyzeForm {
    file: Option<(String, Bytes)>,
    timeframe: Option<String>,
    user_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some((filename, bytes));
            }
            "timeframe" => {
                form.timeframe = Some(field.text().await.map_err(multipart_error)?);
            }
            "user_id" => {
                let user_id = field.text().await.map_err(multipart_error)?;
                form.user_id = Some(user_id).filter(|u| !u.trim().is_empty());
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Human-readable one-line summary of a signal.
pub fn caption(signal: &Signal) -> String {
    match &signal.details {
        Some(SignalDetails::Indicators(report)) => format!(
            "Technical Analysis: {} signal with {} confidence on {}. RSI: {}, MACD: {}",
            signal.action,
            signal.confidence,
            signal.timeframe,
            report.values.rsi_14,
            report.values.macd_line
        ),
        Some(SignalDetails::Patterns(_)) => format!(
            "Chart Pattern Analysis: {} signal detected with {} confidence on {} timeframe.",
            signal.action, signal.confidence, signal.timeframe
        ),
        None => signal.message.clone().unwrap_or_default(),
    }
}

/// Analyze an uploaded CSV or chart image.
async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>> {
    let form = read_form(multipart).await?;

    let (filename, bytes) = form
        .file
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let kind = UploadKind::from_filename(&filename).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
    })?;

    let timeframe = form
        .timeframe
        .as_deref()
        .map(str::trim)
        .and_then(Timeframe::from_str)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid timeframe. Allowed: {}",
                Timeframe::valid_labels()
            ))
        })?;

    tracing::info!(
        "Analyzing {} ({} bytes, {:?}) on {}",
        filename,
        bytes.len(),
        kind,
        timeframe
    );

    let prices = state.prices.clone();
    let signal = tokio::task::spawn_blocking(move || match kind {
        UploadKind::Csv => analyze_csv(&bytes, timeframe.as_str()),
        UploadKind::Image => analyze_image(&bytes, timeframe.as_str(), prices.as_ref()),
    })
    .await
    .map_err(|e| AppError::Internal(format!("analysis task failed: {}", e)))?;

    if signal.is_error() {
        return Err(AppError::BadRequest(
            signal.message.unwrap_or_else(|| "Analysis failed".to_string()),
        ));
    }

    Ok(Json(AnalyzeResponse {
        analysis_id: Uuid::new_v4().to_string(),
        caption: caption(&signal),
        signal,
        file_processed: filename,
        user_id: form.user_id,
    }))
}
