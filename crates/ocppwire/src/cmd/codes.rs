use crate::cmd::CodesArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_codes, OutputFormat};

pub fn run(_args: CodesArgs, format: OutputFormat) -> CliResult<i32> {
    print_codes(format);
    Ok(SUCCESS)
}
