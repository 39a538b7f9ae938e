use std::fmt;
use std::str::FromStr;

use ocppwire_message::{Envelope, Message, MessageTypeId};

use crate::error::{Result, SchemaError};

/// Protocol revisions with a schema namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V16,
    V20,
}

impl ProtocolVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::V16 => "1.6",
            ProtocolVersion::V20 => "2.0",
        }
    }

    /// Directory holding this revision's schemas.
    pub fn namespace(self) -> &'static str {
        match self {
            ProtocolVersion::V16 => "v16",
            ProtocolVersion::V20 => "v20",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = SchemaError;

    fn from_str(version: &str) -> std::result::Result<Self, Self::Err> {
        match version {
            "1.6" => Ok(ProtocolVersion::V16),
            "2.0" => Ok(ProtocolVersion::V20),
            other => Err(SchemaError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Which side of an exchange a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    /// Direction of a frame; `None` for error frames.
    pub fn of(message: &Message) -> Option<Self> {
        Self::from_type_id(message.message_type())
    }

    pub fn from_type_id(type_id: MessageTypeId) -> Option<Self> {
        match type_id {
            MessageTypeId::Request => Some(Direction::Request),
            MessageTypeId::Response => Some(Direction::Response),
            MessageTypeId::ErrorResponse => None,
        }
    }
}

/// Location of one schema document.
///
/// 1.6 request schemas are named after the action alone and responses get
/// a `Response` suffix. 2.0 suffixes both directions and adds `_v1p0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    pub version: ProtocolVersion,
    pub name: String,
}

impl SchemaKey {
    /// Fails with [`SchemaError::InvalidAction`] unless `action` is a
    /// non-empty run of ASCII letters and digits.
    pub fn new(direction: Direction, action: &str, version: ProtocolVersion) -> Result<Self> {
        if !is_action_name(action) {
            return Err(SchemaError::InvalidAction(action.to_string()));
        }
        let name = match (version, direction) {
            (ProtocolVersion::V16, Direction::Request) => action.to_string(),
            (ProtocolVersion::V16, Direction::Response) => format!("{action}Response"),
            (ProtocolVersion::V20, Direction::Request) => format!("{action}Request_v1p0"),
            (ProtocolVersion::V20, Direction::Response) => format!("{action}Response_v1p0"),
        };
        Ok(Self { version, name })
    }

    /// Path relative to the schema directory; also the cache key.
    pub fn relative_path(&self) -> String {
        format!("{}/{}.json", self.version.namespace(), self.name)
    }
}

fn is_action_name(action: &str) -> bool {
    !action.is_empty() && action.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use ocppwire_message::{ErrorResponse, Request};
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_supported_versions() {
        assert_eq!("1.6".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::V16);
        assert_eq!("2.0".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::V20);
    }

    #[test]
    fn rejects_unsupported_version_as_configuration_error() {
        let err = "2.0.1".parse::<ProtocolVersion>().unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedVersion(ref v) if v == "2.0.1"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn v16_suffixes_only_responses() {
        let request = SchemaKey::new(Direction::Request, "BootNotification", ProtocolVersion::V16)
            .unwrap();
        let response =
            SchemaKey::new(Direction::Response, "BootNotification", ProtocolVersion::V16)
                .unwrap();

        assert_eq!(request.relative_path(), "v16/BootNotification.json");
        assert_eq!(response.relative_path(), "v16/BootNotificationResponse.json");
    }

    #[test]
    fn v20_suffixes_both_directions() {
        let request =
            SchemaKey::new(Direction::Request, "Heartbeat", ProtocolVersion::V20).unwrap();
        let response =
            SchemaKey::new(Direction::Response, "Heartbeat", ProtocolVersion::V20).unwrap();

        assert_eq!(request.relative_path(), "v20/HeartbeatRequest_v1p0.json");
        assert_eq!(response.relative_path(), "v20/HeartbeatResponse_v1p0.json");
    }

    #[test]
    fn rejects_actions_that_are_not_plain_names() {
        for action in [
            "",
            "./Heartbeat",
            "../v20/HeartbeatRequest_v1p0",
            "/etc/passwd",
            "Heart beat",
            "Heartbeat\0",
            "Heartbeat.json",
            "Authorize\\..\\x",
            "Båt",
        ] {
            let err = SchemaKey::new(Direction::Request, action, ProtocolVersion::V16)
                .expect_err(action);
            assert!(matches!(err, SchemaError::InvalidAction(ref a) if a == action));
            assert!(!err.is_configuration_error());
        }
    }

    #[test]
    fn accepts_actions_with_digits() {
        let key = SchemaKey::new(
            Direction::Request,
            "Get15118EVCertificate",
            ProtocolVersion::V20,
        )
        .unwrap();
        assert_eq!(key.relative_path(), "v20/Get15118EVCertificateRequest_v1p0.json");
    }

    #[test]
    fn direction_of_message() {
        let request = Request::new("1", "Heartbeat", json!({}));
        let response = request.create_response(json!({}));
        let error = ErrorResponse::new("1", "GenericError", "", json!({}));

        assert_eq!(Direction::of(&request.into()), Some(Direction::Request));
        assert_eq!(Direction::of(&response.into()), Some(Direction::Response));
        assert_eq!(Direction::of(&error.into()), None);
    }
}
