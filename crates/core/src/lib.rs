//! Core types, validation, and the scoring/attribution computation layer
//! for the Atrium lead engine.

pub mod attribution;
pub mod channel;
pub mod error;
pub mod lead;
pub mod limits;
pub mod scoring;
pub mod session;
pub mod submission;

pub use attribution::*;
pub use channel::Channel;
pub use error::{DbErrorCode, Error, RateLimitErrorCode, Result, ValidationErrorCode};
pub use lead::*;
pub use scoring::*;
pub use session::*;
pub use submission::*;
