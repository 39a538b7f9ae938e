use ocppwire_message::{decode, Envelope};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let text = args.input.read()?;
    let message = decode(&text).map_err(|err| frame_error("decode failed", err))?;

    tracing::debug!(
        message_type = %message.message_type(),
        unique_id = message.unique_id(),
        "decoded frame"
    );
    print_message(&message, None, format);
    Ok(SUCCESS)
}
