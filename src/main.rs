use std::process::ExitCode;

fn main() -> ExitCode {
    match microbridge::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            for hint in err.hints() {
                eprintln!("  {hint}");
            }
            ExitCode::FAILURE
        }
    }
}
