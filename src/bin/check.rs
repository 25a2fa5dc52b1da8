//! classgraph-check CLI binary entry point.

use std::process::ExitCode;

use classgraph_core::config::CheckArgs;
use classgraph_core::logging::init_tracing;
use clap::error::ErrorKind;
use clap::Parser;

fn main() -> ExitCode {
    let args = match CheckArgs::try_parse() {
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

    match classgraph::pipeline::run_check(&args) {
        Ok(report) => {
            if report.num_cycle_inconsistent() > 0
                || report.num_source_logical_inconsistent() > 0
                || report.num_inherited_logical_inconsistent() > 0
            {
                eprintln!(
                    "classgraph-check: {} cycle-inconsistent, {} source-logical-inconsistent, {} inherited-logical-inconsistent",
                    report.num_cycle_inconsistent(),
                    report.num_source_logical_inconsistent(),
                    report.num_inherited_logical_inconsistent(),
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("classgraph-check: {e}");
            ExitCode::from(e.exit_code().code())
        }
    }
}
