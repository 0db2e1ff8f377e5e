mod cli;
mod error;
mod output;

use std::sync::Arc;

use bedcontrol_api::SleepIqClient;
use bedcontrol_config::Config;
use bedcontrol_core::{Host, MemoryHost, Platform, Session};
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = bedcontrol_config::load_config(cli.global.config.as_deref())?;
    let global = &cli.global;

    match cli.command {
        Command::Config => {
            output::print_output(&config.to_toml_redacted()?, global.quiet);
            Ok(())
        }

        Command::Discover => {
            let bridge = Bridge::connect(&config).await?;
            bridge.platform.discover().await?;
            let rendered = output::render_beds(
                global.output,
                &bridge.host.accessories(),
                output::should_color(global.color),
            )?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        Command::Run => {
            let bridge = Bridge::connect(&config).await?;
            let beds = bridge.platform.discover().await?;
            info!(beds, "bridge ready");

            let poller = bridge.platform.start_polling().await;
            tokio::signal::ctrl_c().await?;

            info!("shutting down");
            bridge.platform.shutdown();
            if let Some(handle) = poller {
                join_poller(handle).await;
            }
            Ok(())
        }
    }
}

/// Wait for the poll task to stop. Returns false, after logging, when it
/// panicked or was aborted.
async fn join_poller(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "poll task ended abnormally");
            false
        }
    }
}

/// A logged-in platform backed by the in-memory host.
struct Bridge {
    platform: Arc<Platform<SleepIqClient>>,
    host: Arc<MemoryHost>,
}

impl Bridge {
    async fn connect(config: &Config) -> Result<Self, CliError> {
        let credentials = config.credentials()?;
        let email = credentials.email.clone();
        let client = SleepIqClient::new(config.base_url()?, credentials, &config.to_transport())?;
        debug!(base_url = %client.base_url(), "client ready");

        let session = Arc::new(Session::new(Arc::new(client)));
        if !session.login().await? {
            return Err(CliError::AuthFailed { email });
        }

        let host = Arc::new(MemoryHost::new());
        let platform = Arc::new(Platform::new(
            session,
            Arc::clone(&host) as Arc<dyn Host>,
            config.to_platform_config(),
        ));
        Ok(Self { platform, host })
    }
}
