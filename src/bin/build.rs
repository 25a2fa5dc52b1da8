//! classgraph-build CLI binary entry point.

use std::process::ExitCode;

use classgraph_core::config::BuildArgs;
use classgraph_core::logging::init_tracing;
use clap::error::ErrorKind;
use clap::Parser;

fn main() -> ExitCode {
    let args = match BuildArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };
    init_tracing(args.json_logs);

    match classgraph::pipeline::run_build(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("classgraph-build: {e}");
            ExitCode::from(e.exit_code().code())
        }
    }
}
