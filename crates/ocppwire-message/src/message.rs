use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{ErrorCode, OcppError, Result, UnknownErrorCode};

/// Description used when a failure outside the registry is reported back.
pub const GENERIC_ERROR_DESCRIPTION: &str = "An unexpected error occurred.";

/// The leading discriminator of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTypeId {
    Request = 2,
    Response = 3,
    ErrorResponse = 4,
}

impl MessageTypeId {
    /// All discriminators, in the order the decoder tries them.
    pub const ALL: [MessageTypeId; 3] = [
        MessageTypeId::Request,
        MessageTypeId::Response,
        MessageTypeId::ErrorResponse,
    ];

    pub fn as_u64(self) -> u64 {
        self as u64
    }

    /// Match a wire value against the known discriminators.
    ///
    /// Numbers match by value, so `2` and `2.0` are both a Call. Strings
    /// and non-integral numbers such as `"2"` or `2.5` never match.
    pub fn from_wire(value: &Value) -> Option<Self> {
        let id = value.as_f64()?;
        Self::ALL.into_iter().find(|kind| kind.as_u64() as f64 == id)
    }

    /// Number of elements that follow the discriminator on the wire.
    pub fn field_count(self) -> usize {
        match self {
            MessageTypeId::Request => 3,
            MessageTypeId::Response => 2,
            MessageTypeId::ErrorResponse => 4,
        }
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageTypeId::Request => "Request",
            MessageTypeId::Response => "Response",
            MessageTypeId::ErrorResponse => "ErrorResponse",
        };
        f.write_str(name)
    }
}

/// Shared capability of every frame kind.
pub trait Envelope {
    /// The discriminator written first on the wire.
    fn message_type(&self) -> MessageTypeId;

    /// The correlation identifier.
    fn unique_id(&self) -> &str;

    /// The canonical wire array.
    fn to_wire(&self) -> Value;

    /// Serialize to wire text.
    fn encode(&self) -> String {
        self.to_wire().to_string()
    }
}

/// Conversion of a caller's structured type into a payload document.
pub trait ToPayload {
    fn to_payload(&self) -> serde_json::Result<Value>;
}

impl<T: Serialize + ?Sized> ToPayload for T {
    fn to_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// A Call: asks the other side to perform `action`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub unique_id: String,
    pub action: String,
    pub payload: Value,
}

impl Request {
    pub fn new(unique_id: impl Into<String>, action: impl Into<String>, payload: Value) -> Self {
        Self {
            unique_id: unique_id.into(),
            action: action.into(),
            payload,
        }
    }

    /// Build a request whose payload is flattened from a structured value.
    pub fn with_payload<P: ToPayload + ?Sized>(
        unique_id: impl Into<String>,
        action: impl Into<String>,
        payload: &P,
    ) -> serde_json::Result<Self> {
        Ok(Self::new(unique_id, action, payload.to_payload()?))
    }

    /// Answer this request. The response remembers the action so its
    /// payload can be validated later.
    pub fn create_response(&self, payload: Value) -> Response {
        Response::new(self.unique_id.clone(), payload).with_action(self.action.clone())
    }

    /// Answer this request with a structured payload.
    pub fn create_response_with<P: ToPayload + ?Sized>(
        &self,
        payload: &P,
    ) -> serde_json::Result<Response> {
        Ok(self.create_response(payload.to_payload()?))
    }

    /// Turn any failure into a CallError for this request.
    ///
    /// An [`OcppError`] anywhere in the error's source chain is reported
    /// verbatim. Anything else becomes a generic `InternalError`.
    pub fn create_error_response(&self, failure: &(dyn StdError + 'static)) -> ErrorResponse {
        match find_protocol_failure(failure) {
            Some(known) => ErrorResponse::from_failure(self.unique_id.clone(), known),
            None => ErrorResponse::new(
                self.unique_id.clone(),
                ErrorCode::InternalError.as_str(),
                GENERIC_ERROR_DESCRIPTION,
                Value::Object(Map::new()),
            ),
        }
    }

    pub(crate) fn from_fields(fields: &[Value]) -> Result<Self> {
        let kind = MessageTypeId::Request;
        expect_field_count(kind, fields)?;
        Ok(Self {
            unique_id: non_empty(kind, "unique_id", string_field(kind, "unique_id", &fields[0])?)?,
            action: non_empty(kind, "action", string_field(kind, "action", &fields[1])?)?,
            payload: object_field(kind, "payload", &fields[2])?,
        })
    }
}

impl Envelope for Request {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Request
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn to_wire(&self) -> Value {
        json!([
            MessageTypeId::Request.as_u64(),
            self.unique_id,
            self.action,
            self.payload,
        ])
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request(unique_id={}, action={}, payload={})",
            self.unique_id, self.action, self.payload
        )
    }
}

/// A CallResult: the successful answer to a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub unique_id: String,
    pub payload: Value,
    /// Not part of the wire form. Set when the response is created from
    /// a request, or supplied by the caller for a decoded response.
    pub action: Option<String>,
}

impl Response {
    pub fn new(unique_id: impl Into<String>, payload: Value) -> Self {
        Self {
            unique_id: unique_id.into(),
            payload,
            action: None,
        }
    }

    /// Attach the action of the originating request.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub(crate) fn from_fields(fields: &[Value]) -> Result<Self> {
        let kind = MessageTypeId::Response;
        expect_field_count(kind, fields)?;
        Ok(Self::new(
            non_empty(kind, "unique_id", string_field(kind, "unique_id", &fields[0])?)?,
            object_field(kind, "payload", &fields[1])?,
        ))
    }
}

impl Envelope for Response {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Response
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn to_wire(&self) -> Value {
        json!([MessageTypeId::Response.as_u64(), self.unique_id, self.payload])
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response(unique_id={}, action={}, payload={})",
            self.unique_id,
            self.action().unwrap_or("-"),
            self.payload
        )
    }
}

/// A CallError: the failed answer to a [`Request`].
///
/// `error_code` is kept as received so that codes from a newer revision
/// survive decoding; [`ErrorResponse::to_failure`] checks it against the
/// registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub unique_id: String,
    pub error_code: String,
    pub error_description: String,
    pub error_details: Value,
}

impl ErrorResponse {
    pub fn new(
        unique_id: impl Into<String>,
        error_code: impl Into<String>,
        error_description: impl Into<String>,
        error_details: Value,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            error_code: error_code.into(),
            error_description: error_description.into(),
            error_details,
        }
    }

    /// Build a CallError carrying a protocol failure verbatim.
    pub fn from_failure(unique_id: impl Into<String>, failure: &OcppError) -> Self {
        Self::new(
            unique_id,
            failure.code.as_str(),
            failure.description.clone(),
            failure.details.clone(),
        )
    }

    /// Map the received code back to a typed failure.
    pub fn to_failure(&self) -> std::result::Result<OcppError, UnknownErrorCode> {
        let code: ErrorCode = self.error_code.parse()?;
        Ok(OcppError::new(code, self.error_description.clone())
            .with_details(self.error_details.clone()))
    }

    pub(crate) fn from_fields(fields: &[Value]) -> Result<Self> {
        let kind = MessageTypeId::ErrorResponse;
        expect_field_count(kind, fields)?;
        let error_details = match &fields[3] {
            Value::Null => Value::Object(Map::new()),
            other => object_field(kind, "error_details", other)?,
        };
        Ok(Self::new(
            non_empty(kind, "unique_id", string_field(kind, "unique_id", &fields[0])?)?,
            string_field(kind, "error_code", &fields[1])?,
            string_field(kind, "error_description", &fields[2])?,
            error_details,
        ))
    }
}

impl Envelope for ErrorResponse {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::ErrorResponse
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn to_wire(&self) -> Value {
        json!([
            MessageTypeId::ErrorResponse.as_u64(),
            self.unique_id,
            self.error_code,
            self.error_description,
            self.error_details,
        ])
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ErrorResponse(unique_id={}, error_code={}, error_description={}, error_details={})",
            self.unique_id, self.error_code, self.error_description, self.error_details
        )
    }
}

/// Any decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Response(Response),
    ErrorResponse(ErrorResponse),
}

impl Message {
    /// The action, when the frame carries or remembers one.
    pub fn action(&self) -> Option<&str> {
        match self {
            Message::Request(request) => Some(&request.action),
            Message::Response(response) => response.action(),
            Message::ErrorResponse(_) => None,
        }
    }

    /// The payload document. Error frames have none.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Message::Request(request) => Some(&request.payload),
            Message::Response(response) => Some(&response.payload),
            Message::ErrorResponse(_) => None,
        }
    }

    fn envelope(&self) -> &dyn Envelope {
        match self {
            Message::Request(request) => request,
            Message::Response(response) => response,
            Message::ErrorResponse(error) => error,
        }
    }
}

impl Envelope for Message {
    fn message_type(&self) -> MessageTypeId {
        self.envelope().message_type()
    }

    fn unique_id(&self) -> &str {
        self.envelope().unique_id()
    }

    fn to_wire(&self) -> Value {
        self.envelope().to_wire()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Request(request) => fmt::Display::fmt(request, f),
            Message::Response(response) => fmt::Display::fmt(response, f),
            Message::ErrorResponse(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Message::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        Message::Response(response)
    }
}

impl From<ErrorResponse> for Message {
    fn from(error: ErrorResponse) -> Self {
        Message::ErrorResponse(error)
    }
}

fn find_protocol_failure<'a>(failure: &'a (dyn StdError + 'static)) -> Option<&'a OcppError> {
    let mut current = Some(failure);
    while let Some(err) = current {
        if let Some(known) = err.downcast_ref::<OcppError>() {
            return Some(known);
        }
        current = err.source();
    }
    None
}

fn expect_field_count(kind: MessageTypeId, fields: &[Value]) -> Result<()> {
    let expected = kind.field_count();
    if fields.len() != expected {
        return Err(OcppError::new(
            ErrorCode::ProtocolError,
            format!(
                "{kind} frame must have {expected} elements after the MessageTypeId, got {}",
                fields.len()
            ),
        ));
    }
    Ok(())
}

fn string_field(kind: MessageTypeId, name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(OcppError::new(
            ErrorCode::TypeConstraintViolation,
            format!("{kind} field '{name}' must be a string, got {}", json_kind(other)),
        )),
    }
}

fn object_field(kind: MessageTypeId, name: &str, value: &Value) -> Result<Value> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        other => Err(OcppError::new(
            ErrorCode::TypeConstraintViolation,
            format!("{kind} field '{name}' must be an object, got {}", json_kind(other)),
        )),
    }
}

fn non_empty(kind: MessageTypeId, name: &str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(OcppError::new(
            ErrorCode::PropertyConstraintViolation,
            format!("{kind} field '{name}' must not be empty"),
        ));
    }
    Ok(value)
}

/// Name of a JSON value's type, for error descriptions.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
