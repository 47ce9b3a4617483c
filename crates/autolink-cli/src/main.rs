use std::process::ExitCode;

fn main() -> ExitCode {
    autolink_cli::run()
}
