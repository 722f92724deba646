use anyhow::Result;
use clap::Parser;
use dailywallet::cli::Cli;

fn main() -> Result<()> {
    dailywallet::init_tracing();
    let cli = Cli::parse();
    cli.run()
}
