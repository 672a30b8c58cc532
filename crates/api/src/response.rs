//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lead_core::LeadRecord;
use serde::{Deserialize, Serialize};

/// Success response for lead creation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCreatedResponse {
    pub success: bool,
    pub lead: LeadRecord,
    pub timestamp: i64,
}

impl LeadCreatedResponse {
    pub fn created(lead: LeadRecord) -> Self {
        Self {
            success: true,
            lead,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Response for client-profile scoring.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileScoreResponse {
    pub success: bool,
    pub score: u8,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub datastore_connected: bool,
    pub leads_created: u64,
    pub submissions_rejected: u64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type carrying a coded error response.
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
            retry_after: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            response: ErrorResponse::new(msg, "RATE_001"),
            retry_after,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "DB_001", msg)
    }

    pub fn validation(code: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new("Validation failed", code).with_details(errors),
            retry_after: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        // Add Retry-After header for rate limit responses
        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}

impl From<lead_core::Error> for ApiError {
    fn from(err: lead_core::Error) -> Self {
        match &err {
            lead_core::Error::ValidationWithCode { code, message, http_status } => {
                let status =
                    StatusCode::from_u16(*http_status).unwrap_or(StatusCode::BAD_REQUEST);
                ApiError {
                    status,
                    response: ErrorResponse::new("Validation failed", *code)
                        .with_details(vec![message.clone()]),
                    retry_after: None,
                }
            }
            lead_core::Error::Database { code, message, http_status } => {
                let status = StatusCode::from_u16(*http_status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                ApiError::with_code(status, *code, message)
            }
            lead_core::Error::RateLimit { message, retry_after, .. } => {
                ApiError::rate_limited(message, *retry_after)
            }
            lead_core::Error::Validation(msg) => ApiError::bad_request(msg),
            _ => ApiError::internal(err.to_string()),
        }
    }
}
