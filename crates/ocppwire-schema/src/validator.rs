use jsonschema::Validator;
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::key::ProtocolVersion;

/// Actions whose rules are not fully captured by their schema.
pub const SPECIAL_ACTIONS: [&str; 2] = ["SetChargingProfile", "RemoteStartTransaction"];

/// Additional checks for [`SPECIAL_ACTIONS`].
///
/// No checks are defined for these actions yet. Implementations run after
/// the payload passed schema validation, and only for special-cased
/// actions.
pub trait ActionExtension: Send + Sync {
    fn check(&self, action: &str, payload: &Value, version: ProtocolVersion) -> Result<()>;
}

pub fn is_special_action(action: &str) -> bool {
    SPECIAL_ACTIONS.contains(&action)
}

pub(crate) fn validate_payload(action: &str, payload: &Value, validator: &Validator) -> Result<()> {
    let mut errors = validator.iter_errors(payload);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(3) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(SchemaError::ValidationFailed {
            action: action.to_string(),
            payload: payload.clone(),
            message,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ocppwire_message::{decode, ErrorResponse, Message, MessageTypeId, Request};
    use serde_json::json;

    use super::*;
    use crate::config::StoreConfig;
    use crate::key::Direction;
    use crate::store::SchemaStore;

    fn bundled_store() -> SchemaStore {
        SchemaStore::with_config(StoreConfig::with_schema_dir(
            StoreConfig::bundled_schema_dir(),
        ))
    }

    fn boot_notification(payload: Value) -> Message {
        Request::new("19223201", "BootNotification", payload).into()
    }

    #[derive(Default)]
    struct CountingExtension {
        calls: AtomicUsize,
    }

    impl ActionExtension for CountingExtension {
        fn check(&self, _action: &str, _payload: &Value, _version: ProtocolVersion) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RejectingExtension;

    impl ActionExtension for RejectingExtension {
        fn check(&self, action: &str, payload: &Value, _version: ProtocolVersion) -> Result<()> {
            Err(SchemaError::ValidationFailed {
                action: action.to_string(),
                payload: payload.clone(),
                message: "rejected by extension".to_string(),
            })
        }
    }

    fn special_action_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ocppwire-validator-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(dir.join("v16")).unwrap();
        let schema = r#"{
            "type": "object",
            "properties": { "idTag": { "type": "string" } },
            "required": ["idTag"]
        }"#;
        for name in ["RemoteStartTransaction", "Authorize"] {
            std::fs::write(dir.join("v16").join(format!("{name}.json")), schema).unwrap();
        }
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn valid_request_passes() {
        let store = bundled_store();
        let message = boot_notification(json!({
            "chargePointVendor": "VendorX",
            "chargePointModel": "SingleSocketCharger"
        }));

        store.validate(&message, ProtocolVersion::V16).unwrap();
    }

    #[test]
    fn missing_required_field_names_the_action() {
        let store = bundled_store();
        let message = boot_notification(json!({"chargePointVendor": "VendorX"}));

        let err = store.validate(&message, ProtocolVersion::V16).unwrap_err();

        match &err {
            SchemaError::ValidationFailed {
                action,
                payload,
                message,
            } => {
                assert_eq!(action, "BootNotification");
                assert_eq!(payload, &json!({"chargePointVendor": "VendorX"}));
                assert!(message.contains("chargePointModel"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(err.to_string().contains("BootNotification"));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn failed_validation_leaves_cache_intact() {
        let store = bundled_store();
        let bad = boot_notification(json!({"chargePointVendor": 7}));

        assert!(store.validate(&bad, ProtocolVersion::V16).is_err());
        assert!(store.is_cached(Direction::Request, "BootNotification", ProtocolVersion::V16));
        assert_eq!(store.cached_len(), 1);
    }

    #[test]
    fn response_from_request_uses_response_schema() {
        let store = bundled_store();
        let request = Request::new("1", "Heartbeat", json!({}));

        let good = request.create_response(json!({"currentTime": "2013-02-01T20:53:32.486Z"}));
        store.validate_response(&good, ProtocolVersion::V16).unwrap();

        let bad = request.create_response(json!({}));
        assert!(matches!(
            store.validate(&bad.into(), ProtocolVersion::V16),
            Err(SchemaError::ValidationFailed { ref action, .. }) if action == "Heartbeat"
        ));
    }

    #[test]
    fn decoded_response_needs_its_action() {
        let store = bundled_store();
        let Message::Response(response) =
            decode(r#"[3,"1",{"currentTime":"2013-02-01T20:53:32.486Z"}]"#).unwrap()
        else {
            panic!("expected a response");
        };

        assert!(matches!(
            store.validate_response(&response, ProtocolVersion::V16),
            Err(SchemaError::MissingAction(ref id)) if id == "1"
        ));

        let response = response.with_action("Heartbeat");
        store.validate_response(&response, ProtocolVersion::V16).unwrap();
    }

    #[test]
    fn error_response_is_not_validatable() {
        let store = bundled_store();
        let message = Message::from(ErrorResponse::new("1", "GenericError", "", json!({})));

        let err = store.validate(&message, ProtocolVersion::V16).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::NotValidatable(MessageTypeId::ErrorResponse)
        ));
        assert!(err.to_string().contains("can't be validated because message type"));
        assert_eq!(store.cached_len(), 0);
    }

    #[test]
    fn v20_payloads_validate_against_v20_schemas() {
        let store = bundled_store();
        let valid = Request::new(
            "1",
            "BootNotification",
            json!({
                "reason": "PowerUp",
                "chargingStation": {"model": "SingleSocketCharger", "vendorName": "VendorX"}
            }),
        );
        store.validate_request(&valid, ProtocolVersion::V20).unwrap();

        // A 1.6 shaped payload does not satisfy the 2.0 schema.
        let legacy = Request::new(
            "2",
            "BootNotification",
            json!({"chargePointVendor": "VendorX", "chargePointModel": "SingleSocketCharger"}),
        );
        assert!(store.validate_request(&legacy, ProtocolVersion::V20).is_err());

        let bad_reason = Request::new(
            "3",
            "BootNotification",
            json!({
                "reason": "Sunrise",
                "chargingStation": {"model": "SingleSocketCharger", "vendorName": "VendorX"}
            }),
        );
        assert!(store.validate_request(&bad_reason, ProtocolVersion::V20).is_err());
    }

    #[test]
    fn extension_runs_for_special_actions_only() {
        let dir = special_action_dir("extension");
        let store = SchemaStore::with_config(StoreConfig::with_schema_dir(&dir));
        let extension = CountingExtension::default();

        let special = Message::from(Request::new(
            "1",
            "RemoteStartTransaction",
            json!({"idTag": "ABC"}),
        ));
        let plain = Message::from(Request::new("2", "Authorize", json!({"idTag": "ABC"})));

        store
            .validate_with(&special, ProtocolVersion::V16, &extension)
            .unwrap();
        store
            .validate_with(&plain, ProtocolVersion::V16, &extension)
            .unwrap();
        assert_eq!(extension.calls.load(Ordering::SeqCst), 1);

        // Without an extension the special action still validates.
        store.validate(&special, ProtocolVersion::V16).unwrap();

        cleanup(&dir);
    }

    #[test]
    fn extension_is_skipped_when_schema_check_fails() {
        let dir = special_action_dir("extension-order");
        let store = SchemaStore::with_config(StoreConfig::with_schema_dir(&dir));
        let extension = CountingExtension::default();

        let invalid = Message::from(Request::new("1", "RemoteStartTransaction", json!({})));
        assert!(store
            .validate_with(&invalid, ProtocolVersion::V16, &extension)
            .is_err());
        assert_eq!(extension.calls.load(Ordering::SeqCst), 0);

        cleanup(&dir);
    }

    #[test]
    fn extension_errors_propagate() {
        let dir = special_action_dir("extension-reject");
        let store = SchemaStore::with_config(StoreConfig::with_schema_dir(&dir));

        let message = Message::from(Request::new(
            "1",
            "RemoteStartTransaction",
            json!({"idTag": "ABC"}),
        ));
        let err = store
            .validate_with(&message, ProtocolVersion::V16, &RejectingExtension)
            .unwrap_err();
        assert!(err.to_string().contains("rejected by extension"));

        cleanup(&dir);
    }

    #[test]
    fn special_action_list() {
        assert!(is_special_action("SetChargingProfile"));
        assert!(is_special_action("RemoteStartTransaction"));
        assert!(!is_special_action("BootNotification"));
    }
}
