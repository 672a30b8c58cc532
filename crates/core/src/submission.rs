//! Lead submission parsing and validation.
//!
//! Submissions arrive as camelCase JSON from the marketing site's forms.
//! Validation failures are surfaced to the caller before any scoring or
//! attribution work happens; they are never silently defaulted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::attribution::AcquisitionFields;
use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::MAX_FORM_PAYLOAD_BYTES;

/// A raw contact-capture submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadSubmission {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(length(max = 4000))]
    pub message: Option<String>,
    /// Form/record type discriminator (e.g. "consultation", "newsletter").
    #[validate(length(max = 64))]
    pub form_type: Option<String>,
    /// Free-form form payload, carried opaquely (max 16KB serialized).
    pub payload: serde_json::Value,
    /// Originating session, when the tracking snippet supplied one.
    pub session_id: Option<Uuid>,
    /// UTM and click-id fields sent with the form. These take precedence
    /// over the session's values, field by field.
    #[serde(flatten)]
    #[validate(nested)]
    pub acquisition: AcquisitionFields,
}

impl LeadSubmission {
    /// Parses a submission from JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            Error::validation_code(
                ValidationErrorCode::InvalidFormat,
                format!("invalid submission JSON: {}", e),
            )
        })
    }

    fn has(field: &Option<String>) -> bool {
        field.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    /// True when the submission carries nothing at all: no contact fields,
    /// no form type, no acquisition signal, no session, no payload.
    ///
    /// Anonymous submissions with acquisition data alone are accepted and
    /// scored; an entirely empty POST is not a lead.
    pub fn is_empty(&self) -> bool {
        !Self::has(&self.name)
            && !Self::has(&self.email)
            && !Self::has(&self.phone)
            && !Self::has(&self.company)
            && !Self::has(&self.message)
            && !Self::has(&self.form_type)
            && self.acquisition.is_empty()
            && self.session_id.is_none()
            && self.payload.is_null()
    }

    /// Validates the submission. Checked before any computation:
    /// - payload must serialize under the size cap (VALID_003)
    /// - field formats and lengths must hold (VALID_001)
    /// - the submission must not be entirely empty (VALID_002)
    pub fn validate_submission(&self) -> Result<()> {
        if !self.payload.is_null() {
            let size = serde_json::to_vec(&self.payload)
                .map(|v| v.len())
                .unwrap_or(0);
            if size > MAX_FORM_PAYLOAD_BYTES {
                return Err(Error::validation_code(
                    ValidationErrorCode::PayloadTooLarge,
                    format!(
                        "payload {}KB exceeds {}KB limit",
                        size / 1024,
                        MAX_FORM_PAYLOAD_BYTES / 1024
                    ),
                ));
            }
        }

        self.validate().map_err(|e| {
            Error::validation_code(ValidationErrorCode::InvalidFormat, e.to_string())
        })?;

        if self.is_empty() {
            return Err(Error::validation_code(
                ValidationErrorCode::EmptySubmission,
                "submission carries no fields",
            ));
        }

        Ok(())
    }
}
