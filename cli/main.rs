use clap::Parser as _;

use civic_chain_cli_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let output = cli.run().await?;
    // Command output is the product; everything else goes through tracing.
    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
