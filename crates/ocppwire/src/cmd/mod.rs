use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use ocppwire_schema::{Direction, SchemaStore, StoreConfig};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod codes;
pub mod decode;
pub mod schema;
pub mod validate;
pub mod version;

/// Largest frame accepted from a file or stdin.
const MAX_FRAME_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a frame and print its fields.
    Decode(DecodeArgs),
    /// Decode a frame and validate its payload against the action schema.
    Validate(ValidateArgs),
    /// Resolve and print the schema for an action.
    Schema(SchemaArgs),
    /// List the registered error codes.
    Codes(CodesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Validate(args) => validate::run(args, format),
        Command::Schema(args) => schema::run(args, format),
        Command::Codes(args) => codes::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameInput {
    /// Frame text. Read from stdin when neither a frame nor --file is given.
    #[arg(conflicts_with = "file")]
    pub frame: Option<String>,
    /// Read the frame from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl FrameInput {
    pub fn read(&self) -> CliResult<String> {
        let text = match (&self.frame, &self.file) {
            (Some(frame), _) => frame.clone(),
            (None, Some(path)) => read_file(path)?,
            (None, None) => read_stdin()?,
        };

        if text.trim().is_empty() {
            return Err(CliError::new(USAGE, "no frame given"));
        }
        Ok(text)
    }
}

#[derive(Args, Debug)]
pub struct SchemaSource {
    /// OCPP protocol version (1.6 or 2.0).
    #[arg(long, value_name = "VERSION", default_value = "1.6")]
    pub ocpp_version: String,
    /// Directory holding the v16/ and v20/ schema trees.
    #[arg(long, value_name = "DIR", env = "OCPPWIRE_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,
}

impl SchemaSource {
    pub fn store(&self) -> SchemaStore {
        match &self.schema_dir {
            Some(dir) => SchemaStore::with_config(StoreConfig::with_schema_dir(dir)),
            None => SchemaStore::with_config(StoreConfig::with_schema_dir(
                StoreConfig::bundled_schema_dir(),
            )),
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: FrameInput,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: FrameInput,
    /// Action of the originating request. Required to validate a CallResult.
    #[arg(long)]
    pub action: Option<String>,
    #[command(flatten)]
    pub source: SchemaSource,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DirectionArg {
    Request,
    Response,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Request => Direction::Request,
            DirectionArg::Response => Direction::Response,
        }
    }
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Action name, e.g. BootNotification.
    pub action: String,
    /// Which side of the exchange to resolve.
    #[arg(long, value_enum)]
    pub direction: DirectionArg,
    #[command(flatten)]
    pub source: SchemaSource,
}

#[derive(Args, Debug)]
pub struct CodesArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

fn read_file(path: &Path) -> CliResult<String> {
    let file = std::fs::File::open(path)
        .map_err(|err| io_error(&format!("failed to open {}", path.display()), err))?;
    read_limited(file, &path.display().to_string())
}

fn read_stdin() -> CliResult<String> {
    read_limited(std::io::stdin().lock(), "stdin")
}

fn read_limited(reader: impl Read, source: &str) -> CliResult<String> {
    let mut text = String::new();
    let read = reader
        .take(MAX_FRAME_SIZE + 1)
        .read_to_string(&mut text)
        .map_err(|err| io_error(&format!("failed to read {source}"), err))?;
    if read as u64 > MAX_FRAME_SIZE {
        return Err(CliError::new(
            USAGE,
            format!("{source} exceeds {MAX_FRAME_SIZE} bytes"),
        ));
    }
    Ok(text)
}
