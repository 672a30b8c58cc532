//! Field and payload size limits for lead submissions.
//!
//! MEMORY SAFETY: these limits bound what a single submission can allocate.
//! The `#[validate]` derive macro requires literal values in attributes, so
//! field limits are duplicated there. Keep both in sync when modifying.

// === Payload Limits ===

/// Maximum submission body size in bytes (64KB).
///
/// Checked before JSON parsing. Real submissions are well under 4KB; the
/// headroom covers long free-form messages plus a full UTM/click-id set.
pub const MAX_SUBMISSION_BYTES: usize = 64 * 1024;

/// Maximum free-form form payload JSON size in bytes (16KB).
///
/// Applies to the opaque `payload` blob carried alongside the typed fields.
pub const MAX_FORM_PAYLOAD_BYTES: usize = 16 * 1024;

// === Contact Field Limits (chars) ===

/// Contact name max length.
pub const MAX_NAME_LEN: usize = 200;

/// Email max length (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Phone number max length (E.164 is 15 digits; allow formatting).
pub const MAX_PHONE_LEN: usize = 32;

/// Company name max length.
pub const MAX_COMPANY_LEN: usize = 200;

/// Free-form message max length.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Form type discriminator max length.
pub const MAX_FORM_TYPE_LEN: usize = 64;

// === Acquisition Field Limits (chars) ===

/// UTM parameter max length (source/medium/campaign/term/content).
pub const MAX_UTM_LEN: usize = 255;

/// Ad-network click identifier max length.
/// gclid tokens run ~100 chars; some networks pad further.
pub const MAX_CLICK_ID_LEN: usize = 255;

/// Landing page / referrer URL max length.
pub const MAX_URL_LEN: usize = 2048;

// === Session Metadata Limits (chars) ===

/// User ID max length. UUIDs=36, emails=~50, custom IDs up to 128.
pub const MAX_USER_ID_LEN: usize = 128;

/// User agent string max length.
pub const MAX_USER_AGENT_LEN: usize = 512;

/// IP address max length (IPv6 = 45 chars).
pub const MAX_IP_LEN: usize = 45;
