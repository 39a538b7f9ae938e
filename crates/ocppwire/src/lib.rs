//! OCPP-J message envelopes with schema-validated payloads.
//!
//! # Crate Structure
//!
//! - [`message`]: Frame model, wire codec, and the CallError code registry
//! - [`schema`]: Per-action JSON Schema resolution and payload validation
//!
//! ```no_run
//! use ocppwire::message::{decode, Message};
//! use ocppwire::schema::{validate, ProtocolVersion};
//!
//! let frame = r#"[2,"19223201","BootNotification",{"chargePointVendor":"VendorX","chargePointModel":"SingleSocketCharger"}]"#;
//! if let Message::Request(request) = decode(frame)? {
//!     validate(&request.clone().into(), ProtocolVersion::V16)?;
//!     let response = request.create_response(serde_json::json!({
//!         "status": "Accepted",
//!         "currentTime": "2013-02-01T20:53:32.486Z",
//!         "interval": 300
//!     }));
//!     validate(&response.into(), ProtocolVersion::V16)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Re-export message types.
pub mod message {
    pub use ocppwire_message::*;
}

/// Re-export schema types.
pub mod schema {
    pub use ocppwire_schema::*;
}
