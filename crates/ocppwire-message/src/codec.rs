use serde_json::Value;

use crate::error::{ErrorCode, OcppError, Result};
use crate::message::{json_kind, Envelope, ErrorResponse, Message, MessageTypeId, Request, Response};

/// Decode wire text into a frame.
///
/// Wire format:
/// ```text
/// [2, "<UniqueId>", "<Action>", {<Payload>}]
/// [3, "<UniqueId>", {<Payload>}]
/// [4, "<UniqueId>", "<ErrorCode>", "<ErrorDescription>", {<ErrorDetails>}]
/// ```
///
/// Text that is not JSON is a `FormationViolation`. A value that is not an
/// array, or an empty array, is a `ProtocolError`. A discriminator outside
/// {2, 3, 4} is a `PropertyConstraintViolation`.
pub fn decode(text: &str) -> Result<Message> {
    decode_value(text).inspect_err(|err| {
        tracing::debug!(code = %err.code, description = %err.description, "rejected frame");
    })
}

fn decode_value(text: &str) -> Result<Message> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        OcppError::new(
            ErrorCode::FormationViolation,
            format!("Message is not valid JSON: {err}"),
        )
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(OcppError::new(
                ErrorCode::ProtocolError,
                format!(
                    "OCPP message hasn't the correct format. It should be a list, but got {} instead",
                    json_kind(&other)
                ),
            ));
        }
    };

    let Some((type_id, fields)) = items.split_first() else {
        return Err(OcppError::new(
            ErrorCode::ProtocolError,
            "Message doesn't contain MessageTypeId",
        ));
    };

    match MessageTypeId::from_wire(type_id) {
        Some(MessageTypeId::Request) => Request::from_fields(fields).map(Message::Request),
        Some(MessageTypeId::Response) => Response::from_fields(fields).map(Message::Response),
        Some(MessageTypeId::ErrorResponse) => {
            ErrorResponse::from_fields(fields).map(Message::ErrorResponse)
        }
        None => Err(OcppError::new(
            ErrorCode::PropertyConstraintViolation,
            format!("MessageTypeId '{type_id}' isn't valid"),
        )),
    }
}

/// Encode a frame into wire text. Performs no validation.
pub fn encode<E: Envelope + ?Sized>(message: &E) -> String {
    message.encode()
}
