use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

/// Error codes a CallError frame may carry.
///
/// This is a closed registry: every code the protocol defines is listed
/// here, and nothing can be registered at runtime. Codes from the 1.6
/// revision come first, followed by the additions made in 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    NotImplemented,
    NotSupported,
    InternalError,
    ProtocolError,
    SecurityError,
    FormationViolation,
    PropertyConstraintViolation,
    OccurenceConstraintViolation,
    TypeConstraintViolation,
    GenericError,

    // 2.0 additions
    FormatViolation,
    OccurrenceConstraintViolation,
    MessageTypeNotSupported,
    RpcFrameworkError,
}

impl ErrorCode {
    /// Every registered code, in registry order.
    pub const ALL: [ErrorCode; 14] = [
        ErrorCode::NotImplemented,
        ErrorCode::NotSupported,
        ErrorCode::InternalError,
        ErrorCode::ProtocolError,
        ErrorCode::SecurityError,
        ErrorCode::FormationViolation,
        ErrorCode::PropertyConstraintViolation,
        ErrorCode::OccurenceConstraintViolation,
        ErrorCode::TypeConstraintViolation,
        ErrorCode::GenericError,
        ErrorCode::FormatViolation,
        ErrorCode::OccurrenceConstraintViolation,
        ErrorCode::MessageTypeNotSupported,
        ErrorCode::RpcFrameworkError,
    ];

    /// The code as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotImplemented => "NotImplemented",
            ErrorCode::NotSupported => "NotSupported",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::ProtocolError => "ProtocolError",
            ErrorCode::SecurityError => "SecurityError",
            ErrorCode::FormationViolation => "FormationViolation",
            ErrorCode::PropertyConstraintViolation => "PropertyConstraintViolation",
            ErrorCode::OccurenceConstraintViolation => "OccurenceConstraintViolation",
            ErrorCode::TypeConstraintViolation => "TypeConstraintViolation",
            ErrorCode::GenericError => "GenericError",
            ErrorCode::FormatViolation => "FormatViolation",
            ErrorCode::OccurrenceConstraintViolation => "OccurrenceConstraintViolation",
            ErrorCode::MessageTypeNotSupported => "MessageTypeNotSupported",
            ErrorCode::RpcFrameworkError => "RpcFrameworkError",
        }
    }

    /// Description the protocol text attaches to the code.
    pub fn default_description(self) -> &'static str {
        match self {
            ErrorCode::NotImplemented => "Requested Action is not known by receiver",
            ErrorCode::NotSupported => {
                "Requested Action is recognized but not supported by the receiver"
            }
            ErrorCode::InternalError => {
                "An internal error occurred and the receiver was not able to process the \
                 requested Action successfully"
            }
            ErrorCode::ProtocolError => "Payload for Action is incomplete",
            ErrorCode::SecurityError => {
                "During the processing of Action a security issue occurred preventing \
                 receiver from completing the Action successfully"
            }
            ErrorCode::FormationViolation => {
                "Payload for Action is syntactically incorrect or not conform the PDU \
                 structure for Action"
            }
            ErrorCode::PropertyConstraintViolation => {
                "Payload is syntactically correct but at least one field contains an \
                 invalid value"
            }
            ErrorCode::OccurenceConstraintViolation
            | ErrorCode::OccurrenceConstraintViolation => {
                "Payload for Action is syntactically correct but at least one of the fields \
                 violates occurrence constraints"
            }
            ErrorCode::TypeConstraintViolation => {
                "Payload for Action is syntactically correct but at least one of the fields \
                 violates data type constraints"
            }
            ErrorCode::GenericError => "Any other error not covered by the previous ones",
            ErrorCode::FormatViolation => "Payload for Action is syntactically incorrect",
            ErrorCode::MessageTypeNotSupported => {
                "A message with a Message Type Number received that is not supported by \
                 this implementation"
            }
            ErrorCode::RpcFrameworkError => {
                "Content of the call is not a valid RPC Request, for example: MessageId \
                 could not be read"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(code: &str) -> std::result::Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|known| known.as_str() == code)
            .ok_or_else(|| UnknownErrorCode(code.to_string()))
    }
}

/// A protocol-level failure: one of the registered error codes together
/// with a description and a details document.
///
/// Framing failures raised by [`decode`](crate::decode) are values of this
/// type, as are failures reconstructed from a received CallError.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {description}")]
pub struct OcppError {
    pub code: ErrorCode,
    pub description: String,
    pub details: Value,
}

impl OcppError {
    /// Create a failure with empty details.
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            details: Value::Object(Map::new()),
        }
    }

    /// Create a failure carrying the code's default description.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_description())
    }

    /// Attach a details document.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

/// A received CallError used a code outside the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error code '{0}' is not a registered OCPP error code")]
pub struct UnknownErrorCode(pub String);

pub type Result<T> = std::result::Result<T, OcppError>;
