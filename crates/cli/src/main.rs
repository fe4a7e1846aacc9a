use std::process::ExitCode;

fn main() -> ExitCode {
    fournee_cli::run()
}
