//! Client profile scoring endpoint.

use axum::Json;
use lead_core::{score_client_profile, ClientProfile};
use telemetry::metrics;
use tracing::debug;

use crate::response::ProfileScoreResponse;

/// POST /clients/score - Pure scoring of a CRM client profile.
///
/// Stateless: nothing is persisted. Uses the client-profile score table,
/// which is separate from lead scoring.
pub async fn score_profile_handler(
    Json(profile): Json<ClientProfile>,
) -> Json<ProfileScoreResponse> {
    let score = score_client_profile(&profile);
    metrics().profile_scores_computed.inc();

    debug!(score = score, "Scored client profile");

    Json(ProfileScoreResponse {
        success: true,
        score,
    })
}
