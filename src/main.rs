use std::error::Error;

mod cli;

use clap::Parser;
use wsn_client::QueryClient;

use crate::cli::{Command, Options};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let options = Options::parse();

    cli::init_tracing(options.verbose);

    let client = QueryClient::new(options.client_config())?;

    match options.command {
        Command::Query(args) => cli::query::run(&client, args, options.verbose).await?,
        Command::Download(args) => cli::download::run(&client, args).await?,
        Command::Upload(args) => cli::upload::run(&client, args).await?,
    }

    Ok(())
}
