mod cli;
mod platform;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    // A .env next to the binary may supply RESUME_ANALYZER_API_URL.
    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();

    match platform::run_app(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
