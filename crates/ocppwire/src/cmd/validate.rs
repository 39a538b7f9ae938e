use ocppwire_message::{decode, Envelope, Message};
use ocppwire_schema::ProtocolVersion;

use crate::cmd::ValidateArgs;
use crate::exit::{frame_error, schema_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let version: ProtocolVersion = args
        .source
        .ocpp_version
        .parse()
        .map_err(|err| schema_error("invalid --ocpp-version", err))?;

    let text = args.input.read()?;
    let message = decode(&text).map_err(|err| frame_error("decode failed", err))?;
    let message = attach_action(message, args.action);

    let store = args.source.store();
    store
        .validate(&message, version)
        .map_err(|err| schema_error("validation failed", err))?;

    tracing::info!(
        unique_id = message.unique_id(),
        action = message.action().unwrap_or_default(),
        version = %version,
        "payload valid"
    );
    print_message(&message, Some(version), format);
    Ok(SUCCESS)
}

/// A CallResult does not carry its action on the wire; take it from the
/// command line when given.
fn attach_action(message: Message, action: Option<String>) -> Message {
    match (message, action) {
        (Message::Response(response), Some(action)) => response.with_action(action).into(),
        (message, Some(action)) => {
            if message.action().is_some_and(|own| own != action) {
                tracing::warn!(
                    frame_action = message.action().unwrap_or_default(),
                    requested = %action,
                    "--action ignored; frame names its own action"
                );
            }
            message
        }
        (message, None) => message,
    }
}

#[cfg(test)]
mod tests {
    use ocppwire_message::{Request, Response};
    use serde_json::json;

    use super::*;

    #[test]
    fn action_is_attached_to_responses() {
        let message = Message::from(Response::new("1", json!({})));
        let message = attach_action(message, Some("Heartbeat".to_string()));
        assert_eq!(message.action(), Some("Heartbeat"));
    }

    #[test]
    fn request_keeps_its_own_action() {
        let message = Message::from(Request::new("1", "Heartbeat", json!({})));
        let message = attach_action(message, Some("Authorize".to_string()));
        assert_eq!(message.action(), Some("Heartbeat"));
    }
}
