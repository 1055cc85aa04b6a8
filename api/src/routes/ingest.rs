//! Record ingestion endpoints.
//!
//! `POST /api/v1/ingest` accepts push-channel envelopes; the per-signal
//! endpoints in the sibling modules accept bare DTOs. Either way each
//! element of a batch is decoded and applied on its own, so one malformed
//! record is reported without affecting the others.

use super::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::ingest::{Envelope, IngestError, Ingested, Telemetry};

/// A record that could not be ingested.
#[derive(Debug, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position in the batch (0 for single requests).
    pub index: usize,
    /// Why the record was rejected.
    pub message: String,
}

/// Outcome of an ingestion request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Records that changed the stored state.
    pub accepted: usize,
    /// Spans that were already known.
    pub duplicates: usize,
    /// Metric samples without data.
    pub ignored: usize,
    /// Records that failed to decode or parse.
    pub rejected: usize,
    /// Details of the rejected records.
    pub errors: Vec<RejectedRecord>,
}

impl IngestSummary {
    fn count(&mut self, index: usize, outcome: Result<Ingested, IngestError>) {
        match outcome {
            Ok(Ingested::Span | Ingested::Log | Ingested::Metric) => self.accepted += 1,
            Ok(Ingested::DuplicateSpan) => self.duplicates += 1,
            Ok(Ingested::Ignored) => self.ignored += 1,
            Err(e) => {
                tracing::debug!(index, error = %e, "Rejected record");
                self.rejected += 1;
                self.errors.push(RejectedRecord {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }

    /// `201` if anything was stored, `422` if every record was rejected,
    /// `200` otherwise.
    fn status(&self) -> StatusCode {
        if self.accepted > 0 {
            StatusCode::CREATED
        } else if self.rejected > 0 && self.duplicates == 0 && self.ignored == 0 {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::OK
        }
    }
}

/// Unwraps the request body into its records: an array is a batch, any
/// other value a single record.
///
/// # Errors
///
/// Returns `400 invalid_json` for unparsable bodies and `400 empty_batch`
/// for empty arrays.
pub(crate) fn batch(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Vec<Value>> {
    let Json(body) = payload
        .map_err(|rejection| ApiError::bad_request("invalid_json", rejection.body_text()))?;

    let records = match body {
        Value::Array(records) => records,
        record => vec![record],
    };

    if records.is_empty() {
        return Err(ApiError::bad_request(
            "empty_batch",
            "At least one record is required",
        ));
    }
    Ok(records)
}

/// Applies each record to the hub in order under one write lock.
pub(crate) fn ingest_records<F>(
    state: &AppState,
    records: Vec<Value>,
    mut apply: F,
) -> ApiResult<(StatusCode, Json<IngestSummary>)>
where
    F: FnMut(&mut Telemetry, Value) -> Result<Ingested, IngestError>,
{
    let mut telemetry = state.write()?;
    let mut summary = IngestSummary::default();

    for (index, record) in records.into_iter().enumerate() {
        let outcome = apply(&mut *telemetry, record);
        summary.count(index, outcome);
    }
    drop(telemetry);

    tracing::debug!(
        accepted = summary.accepted,
        duplicates = summary.duplicates,
        ignored = summary.ignored,
        rejected = summary.rejected,
        "Ingested batch"
    );
    Ok((summary.status(), Json(summary)))
}

/// Creates the envelope ingestion route.
pub fn ingest_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ingest", post(ingest_envelopes))
        .with_state(state)
}

async fn ingest_envelopes(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngestSummary>)> {
    let records = batch(payload)?;
    ingest_records(&state, records, |telemetry, record| {
        let envelope: Envelope = serde_json::from_value(record)?;
        telemetry.ingest(envelope)
    })
}
