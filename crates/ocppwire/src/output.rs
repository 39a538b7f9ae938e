use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ocppwire_message::{Envelope, ErrorCode, Message};
use ocppwire_schema::{ProtocolVersion, Schema};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    message_type: String,
    message_type_id: u64,
    unique_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_details: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validated_against: Option<&'a str>,
}

impl<'a> MessageOutput<'a> {
    fn new(message: &'a Message, validated: Option<ProtocolVersion>) -> Self {
        let error = match message {
            Message::ErrorResponse(error) => Some(error),
            _ => None,
        };
        Self {
            schema_id: "https://schemas.3leaps.dev/ocppwire/cli/v1/message.schema.json",
            message_type: message.message_type().to_string(),
            message_type_id: message.message_type().as_u64(),
            unique_id: message.unique_id(),
            action: message.action(),
            payload: message.payload(),
            error_code: error.map(|e| e.error_code.as_str()),
            error_description: error.map(|e| e.error_description.as_str()),
            error_details: error.map(|e| &e.error_details),
            validated_against: validated.map(ProtocolVersion::as_str),
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("TYPE", format!("{} ({})", self.message_type, self.message_type_id)),
            ("UNIQUE ID", self.unique_id.to_string()),
        ];
        if let Some(action) = self.action {
            rows.push(("ACTION", action.to_string()));
        }
        if let Some(payload) = self.payload {
            rows.push(("PAYLOAD", payload.to_string()));
        }
        if let Some(code) = self.error_code {
            rows.push(("ERROR CODE", code.to_string()));
        }
        if let Some(description) = self.error_description {
            rows.push(("DESCRIPTION", description.to_string()));
        }
        if let Some(details) = self.error_details {
            rows.push(("DETAILS", details.to_string()));
        }
        if let Some(version) = self.validated_against {
            rows.push(("VALID", format!("yes (OCPP {version})")));
        }
        rows
    }
}

pub fn print_message(message: &Message, validated: Option<ProtocolVersion>, format: OutputFormat) {
    let out = MessageOutput::new(message, validated);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (field, value) in out.rows() {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => match validated {
            Some(version) => println!("{message} valid for OCPP {version}"),
            None => println!("{message}"),
        },
    }
}

#[derive(Serialize)]
struct SchemaOutput<'a> {
    schema_id: &'a str,
    path: &'a str,
    document: &'a Value,
}

pub fn print_schema(schema: &Schema, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SchemaOutput {
            schema_id: "https://schemas.3leaps.dev/ocppwire/cli/v1/schema.schema.json",
            path: schema.path(),
            document: schema.document(),
        }),
        OutputFormat::Table => {
            let document = schema.document();
            let required = document["required"]
                .as_array()
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            let properties = document["properties"]
                .as_object()
                .map(|props| props.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();

            let mut table = new_table(vec!["PATH", "PROPERTIES", "REQUIRED"]);
            table.add_row(vec![schema.path().to_string(), properties, required]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let text = serde_json::to_string_pretty(schema.document())
                .unwrap_or_else(|_| schema.document().to_string());
            println!("# {}", schema.path());
            println!("{text}");
        }
    }
}

#[derive(Serialize)]
struct CodeOutput {
    code: ErrorCode,
    revision: &'static str,
    description: &'static str,
}

pub fn print_codes(format: OutputFormat) {
    let codes: Vec<CodeOutput> = ErrorCode::ALL
        .into_iter()
        .map(|code| CodeOutput {
            code,
            revision: code_revision(code),
            description: code.default_description(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&codes),
        OutputFormat::Table => {
            let mut table = new_table(vec!["CODE", "SINCE", "DESCRIPTION"]);
            for entry in &codes {
                table.add_row(vec![
                    entry.code.to_string(),
                    entry.revision.to_string(),
                    entry.description.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in &codes {
                println!("{:<30} {}  {}", entry.code, entry.revision, entry.description);
            }
        }
    }
}

fn code_revision(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::FormatViolation
        | ErrorCode::OccurrenceConstraintViolation
        | ErrorCode::MessageTypeNotSupported
        | ErrorCode::RpcFrameworkError => "2.0",
        _ => "1.6",
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
