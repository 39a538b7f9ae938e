//! JSON Schema validation of OCPP payloads.
//!
//! Schemas are resolved per (direction, action, protocol version), loaded
//! from disk on first use, and cached for the lifetime of the store.
//!
//! ```no_run
//! use ocppwire_message::decode;
//! use ocppwire_schema::ProtocolVersion;
//!
//! let message = decode(r#"[2,"1","Heartbeat",{}]"#)?;
//! ocppwire_schema::validate(&message, "1.6".parse::<ProtocolVersion>()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod store;
pub mod validator;

use std::sync::Arc;

use ocppwire_message::Message;

pub use config::{StoreConfig, SCHEMA_DIR_ENV};
pub use error::{Result, SchemaError};
pub use key::{Direction, ProtocolVersion, SchemaKey};
pub use store::{Schema, SchemaStore};
pub use validator::{is_special_action, ActionExtension, SPECIAL_ACTIONS};

/// Resolve a schema through the process-wide store.
pub fn get_schema(
    direction: Direction,
    action: &str,
    version: ProtocolVersion,
) -> Result<Arc<Schema>> {
    SchemaStore::global().get_schema(direction, action, version)
}

/// Validate a message through the process-wide store.
pub fn validate(message: &Message, version: ProtocolVersion) -> Result<()> {
    SchemaStore::global().validate(message, version)
}
