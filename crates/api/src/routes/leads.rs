//! Lead intake endpoint.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use lead_core::{limits::MAX_SUBMISSION_BYTES, LeadSubmission, ValidationErrorCode};
use telemetry::metrics;
use tracing::{debug, error, warn};

use crate::extractors::ClientIp;
use crate::middleware::rate_limit::RateLimitDecision;
use crate::response::{ApiError, LeadCreatedResponse};
use crate::state::AppState;

/// POST /leads - Primary lead intake endpoint.
///
/// Accepts a camelCase JSON submission from the marketing site, runs it
/// through the ingestion pipeline, and returns the persisted record with
/// score, attribution sources, and repeat-lead fields.
pub async fn create_lead_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    body: Bytes,
) -> Result<(StatusCode, Json<LeadCreatedResponse>), ApiError> {
    metrics().submissions_received.inc();

    let key = client_ip.unwrap_or_else(|| "unknown".to_string());
    if let RateLimitDecision::Limited { retry_after } = state.rate_limiter.check(&key).await {
        metrics().rate_limited_requests.inc();
        warn!(client_ip = %key, "Submission rate limited");
        return Err(ApiError::rate_limited(
            "Too many submissions",
            Some(retry_after),
        ));
    }

    // Check body size before parsing
    if body.len() > MAX_SUBMISSION_BYTES {
        metrics().submissions_rejected.inc();
        return Err(ApiError::validation(
            ValidationErrorCode::PayloadTooLarge.code(),
            vec![format!(
                "Submission size {}KB exceeds {}KB limit",
                body.len() / 1024,
                MAX_SUBMISSION_BYTES / 1024
            )],
        ));
    }

    debug!(
        client_ip = %key,
        payload_size = body.len(),
        "Received lead submission"
    );

    let submission = LeadSubmission::parse(&body).map_err(|e| {
        metrics().submissions_rejected.inc();
        warn!("Failed to parse submission: {}", e);
        ApiError::from(e)
    })?;

    let record = state.pipeline.ingest(submission).await.map_err(|e| {
        if e.error_code().is_some_and(|c| c.starts_with("VALID")) {
            metrics().submissions_rejected.inc();
            warn!("Submission rejected: {}", e);
        } else {
            error!("Failed to persist lead: {}", e);
        }
        ApiError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(LeadCreatedResponse::created(record)),
    ))
}
