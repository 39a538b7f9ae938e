use ocppwire_schema::{Direction, ProtocolVersion};

use crate::cmd::SchemaArgs;
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{print_schema, OutputFormat};

pub fn run(args: SchemaArgs, format: OutputFormat) -> CliResult<i32> {
    let version: ProtocolVersion = args
        .source
        .ocpp_version
        .parse()
        .map_err(|err| schema_error("invalid --ocpp-version", err))?;
    let direction = Direction::from(args.direction);

    let schema = args
        .source
        .store()
        .get_schema(direction, &args.action, version)
        .map_err(|err| schema_error("schema lookup failed", err))?;

    print_schema(&schema, format);
    Ok(SUCCESS)
}
