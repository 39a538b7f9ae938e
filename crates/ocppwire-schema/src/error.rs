use ocppwire_message::MessageTypeId;
use serde_json::Value;

/// Errors that can occur during schema resolution and payload validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The protocol version has no schema namespace.
    #[error("unsupported OCPP version '{0}' (expected \"1.6\" or \"2.0\")")]
    UnsupportedVersion(String),

    /// The action cannot name a schema file.
    #[error("action '{0}' is not a valid action name")]
    InvalidAction(String),

    /// The schema document could not be read, parsed, or compiled.
    #[error("failed to load validation schema for action '{action}': {message}")]
    LoadFailed { action: String, message: String },

    /// The payload does not satisfy its schema.
    #[error("payload '{payload}' for action '{action}' is not valid: {message}")]
    ValidationFailed {
        action: String,
        payload: Value,
        message: String,
    },

    /// Only requests and responses carry a payload.
    #[error(
        "payload can't be validated because message type is {0}, \
         but it should be either Request or Response"
    )]
    NotValidatable(MessageTypeId),

    /// A response decoded from the wire does not know its action.
    #[error("response '{0}' has no action; supply the action of the originating request")]
    MissingAction(String),
}

impl SchemaError {
    /// True for faults in deployment rather than in the message: an
    /// unsupported version or a schema that cannot be loaded.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SchemaError::UnsupportedVersion(_) | SchemaError::LoadFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
