//! `gwbridge` entry point.

use clap::Parser;

use gwbridge_cli::{Cli, init_logging, load_env, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(cli.into_settings()).await
}
