use clap::Parser;
use rainraster::cli::{run, Cli};
use rainraster::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
