use clap::Parser;
use pm_maker::cli::{Cli, Commands};
use pm_maker::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Configuration errors are fatal before anything else runs
    let config = Config::load(&cli.config)
        .map_err(|e| anyhow::anyhow!("Could not load config from {}: {}", cli.config, e))?;

    // Initialize telemetry
    let _telemetry = pm_maker::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(platform = %config.platform, "Starting market maker");
            args.execute(&config).await?;
        }
        Commands::Markets(args) => {
            args.execute(&config).await?;
        }
        Commands::Quote(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("Current configuration ({}):", cli.config);
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
