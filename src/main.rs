use std::process::ExitCode;

fn main() -> ExitCode {
    match meta_update::cli::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
