// fusion_cli/src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use fusion_cli::cli::Cli;
use fusion_cli::{format_rmse, load_config, run_files};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.overrides())?;

    if cli.print_config {
        let rendered =
            toml::to_string_pretty(&config).context("failed to render the configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    let input = cli.input.as_deref().context("an input file is required")?;
    let summary = run_files(input, cli.output.as_deref(), &config.filter)?;
    let rmse = summary
        .rmse
        .context("no estimates were produced, so the RMSE is undefined")?;
    println!("{}", format_rmse(&rmse));

    Ok(())
}
