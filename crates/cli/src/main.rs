use std::process::ExitCode;

fn main() -> ExitCode {
    warmind_cli::run()
}
