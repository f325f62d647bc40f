//! modelctl binary entry point.

use std::process::ExitCode;

use modelctl::cli::{self, Cli};
use modelctl::ui::output;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    cli::init_logging(cli.debug);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
