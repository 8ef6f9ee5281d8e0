use std::process::ExitCode;

fn main() -> ExitCode {
    match reposync::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            reposync::ui::output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
