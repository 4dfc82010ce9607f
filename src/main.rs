// src/main.rs

use samplegen::errors::SamplegenError;
use samplegen::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("samplegen error: {err:?}");
        std::process::exit(err.exit_code());
    }
}

async fn run_main() -> Result<(), SamplegenError> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
