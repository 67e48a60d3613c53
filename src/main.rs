use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    match partline::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
