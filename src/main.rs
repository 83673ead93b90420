use clap::Parser;
use noema::cli::{Cli, Commands};
use noema::NoemaResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> NoemaResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet). init/config may create it.
    let config = match &cli.command {
        Commands::Init { .. } | Commands::Config => cli.load_config().unwrap_or_default(),
        _ => cli.load_config()?,
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("noema={}", log_level)
            .parse()
            .unwrap_or_else(|_| "noema=info".parse().expect("fallback directive is valid")),
    );

    // stdout carries MCP frames and command output, logs go to stderr
    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!(config = %cli.config_path().display(), "Configuration resolved");

    match &cli.command {
        Commands::Init { path } => {
            noema::cli::commands::init(path.clone()).await?;
        }
        Commands::Serve => {
            noema::cli::commands::serve(&config).await?;
        }
        Commands::Config => {
            noema::cli::commands::config_cmd(&cli.config_path()).await?;
        }
        Commands::Doctor => {
            noema::cli::commands::doctor(&config).await?;
        }
        Commands::Version => {
            noema::cli::commands::version();
        }
        Commands::Recognize {
            input,
            json,
            atom_type,
            user,
        } => {
            noema::cli::commands::recognize(
                input.as_deref(),
                *json,
                atom_type.as_deref(),
                user.as_deref(),
                &config,
            )
            .await?;
        }
        Commands::Reason {
            reasoning_type,
            code,
            atoms,
            user,
        } => {
            noema::cli::commands::reason(
                reasoning_type.as_deref(),
                code.as_deref(),
                atoms.as_deref(),
                user.as_deref(),
                &config,
            )
            .await?;
        }
        Commands::Atoms { action } => {
            noema::cli::commands::atoms(action, &config).await?;
        }
        Commands::Export { output } => {
            noema::cli::commands::export_atoms(output, &config).await?;
        }
        Commands::Import { input } => {
            noema::cli::commands::import_atoms(input, &config).await?;
        }
    }

    Ok(())
}
