//! OCPP-J message envelopes.
//!
//! Every frame on the wire is a JSON array led by a numeric MessageTypeId:
//! - `2` Call (a [`Request`])
//! - `3` CallResult (a [`Response`])
//! - `4` CallError (an [`ErrorResponse`])
//!
//! This crate turns wire text into typed frames and back, and maps
//! CallError codes to a closed registry of protocol failures.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode, encode};
pub use error::{ErrorCode, OcppError, Result, UnknownErrorCode};
pub use message::{
    Envelope, ErrorResponse, Message, MessageTypeId, Request, Response, ToPayload,
    GENERIC_ERROR_DESCRIPTION,
};
