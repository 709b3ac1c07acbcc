use std::process::ExitCode;

use llmx::cli::commands::CommandFailed;

fn main() -> ExitCode {
    match llmx::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A failed shell command already printed its stderr.
            if let Some(failed) = e.downcast_ref::<CommandFailed>() {
                return ExitCode::from(u8::try_from(failed.code).unwrap_or(1));
            }
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
