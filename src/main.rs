// src/main.rs

use std::process::ExitCode;

use assetpipe::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("assetpipe: could not set up logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match assetpipe::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("assetpipe error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
