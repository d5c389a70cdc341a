//! InvokeItself CLI - drive the application core from the command line
//!
//! Provides subcommands for invoking the clock target directly, simulating a
//! thumbnail notification, and replaying an event stream from stdin.

use clap::{Parser, Subcommand};
use invoke_itself::app::error::Result;
use invoke_itself::app::storage;
use invoke_itself::app::trigger::LineSource;
use invoke_itself::{AppConfig, Application};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "invoke-itself")]
#[command(
    about = "Invoke the clock app on click or shortly after being thumbnailed",
    long_about = None
)]
struct Cli {
    /// Config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Locale to load instead of the process locale
    #[arg(long)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Invoke the target immediately, as the button does
    Click,

    /// Simulate a thumbnail notification and wait for the deferred invoke
    Thumbnail {
        /// Override the configured delay
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Read events from stdin: click, thumbnail, restore, locale <id>
    Run,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;
    let locale = cli.locale;
    let load = move || -> Result<AppConfig> {
        let mut config = storage::load_or_default(config_path.as_deref())?;
        if locale.is_some() {
            config.locale = locale;
        }
        Ok(config)
    };

    match cli.command {
        Commands::Init { path } => {
            let path = path.unwrap_or_else(storage::default_config_path);
            storage::write_config(&AppConfig::default(), &path)?;
            println!("Wrote default config to {:?}", path);
        }

        Commands::Click => {
            let app = Application::from_config(load()?)?;
            let disposition = app.click();
            println!("{}: {}", app.translations().tr("Invoke"), disposition);
        }

        Commands::Thumbnail { delay_ms } => {
            let mut config = load()?;
            if let Some(delay_ms) = delay_ms {
                config.thumbnail_delay_ms = delay_ms;
            }
            let app = Application::from_config(config)?;
            app.on_thumbnail();

            for disposition in app.deferred().drain().await? {
                println!("Deferred invoke: {}", disposition);
            }
        }

        Commands::Run => {
            let mut app = Application::from_config(load()?)?;
            let source = LineSource::new(io::BufReader::new(io::stdin()));
            let summary = app.run(Box::new(source)).await?;

            println!("Handled {} events", summary.events);
            for disposition in summary.immediate {
                println!("  immediate: {}", disposition);
            }
            for disposition in summary.deferred {
                println!("  deferred: {}", disposition);
            }
        }
    }

    Ok(())
}
