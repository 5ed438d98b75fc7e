mod exit;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tcat_client::config::{ClientConfig, DEFAULT_AUTH_DIR, DEFAULT_SERVER_NAME};
use tcat_client::console::StdConsole;
use tcat_client::engine::{self, Collaborators, Context};
use tcat_client::output::OutputFormat;
use tcat_client::session::PemDirectory;
use tcat_client::transport::{UdpConfig, UdpLink};
use tracing::info;

use crate::exit::{io_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "tcat", version, about = "TCAT commissioning client")]
struct Cli {
    /// Directory with commissioner_cert.pem, commissioner_key.pem and ca_cert.pem.
    #[arg(long, value_name = "DIR", env = "TCAT_AUTH_DIR", default_value = DEFAULT_AUTH_DIR)]
    auth_dir: PathBuf,

    /// Identity the device must present in the handshake.
    #[arg(long, value_name = "NAME", env = "TCAT_SERVER_NAME", default_value = DEFAULT_SERVER_NAME)]
    server_name: String,

    /// Talk to simulated node NODE_ID over UDP instead of Bluetooth.
    #[arg(long, value_name = "NODE_ID")]
    simulation: Option<u16>,

    /// Host running the simulated nodes.
    #[arg(long, value_name = "HOST", default_value = "127.0.0.1")]
    simulation_host: String,

    /// How long a Bluetooth scan listens for devices.
    #[arg(long, value_name = "SECS", default_value = "10")]
    ble_scan_secs: u64,

    /// Result output format.
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn run(cli: Cli) -> CliResult<i32> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;
    runtime.block_on(interactive(cli))
}

async fn interactive(cli: Cli) -> CliResult<i32> {
    let config = ClientConfig {
        server_name: cli.server_name.clone(),
        auth_dir: cli.auth_dir.clone(),
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
        ..ClientConfig::default()
    };
    let collaborators = collaborators(&cli, &config).await?;

    let mut ctx = Context::new(
        Arc::new(tcat_client::cmd::registry()),
        Box::new(StdConsole::new()),
        collaborators,
        config,
    );
    info!("ready; type 'help' for commands");

    engine::run(&mut ctx)
        .await
        .map_err(|err| CliError::new(FAILURE, err.to_string()))?;
    Ok(SUCCESS)
}

async fn collaborators(cli: &Cli, config: &ClientConfig) -> CliResult<Collaborators> {
    let credentials = Arc::new(PemDirectory::new(&config.auth_dir));

    if let Some(node_id) = cli.simulation {
        let link = Arc::new(UdpLink::new(UdpConfig {
            host: cli.simulation_host.clone(),
            node_id,
            ..UdpConfig::default()
        }));
        info!(address = %link.config().node_address(), "using simulation link");
        return Ok(Collaborators {
            discovery: link.clone(),
            connector: link,
            credentials,
        });
    }

    ble_collaborators(cli, credentials).await
}

#[cfg(feature = "ble")]
async fn ble_collaborators(cli: &Cli, credentials: Arc<PemDirectory>) -> CliResult<Collaborators> {
    use std::time::Duration;

    use tcat_client::transport::{BleConfig, BleLink};

    let link = BleLink::new(BleConfig {
        scan_duration: Duration::from_secs(cli.ble_scan_secs),
        ..BleConfig::default()
    })
    .await
    .map_err(|err| crate::exit::transport_error("bluetooth unavailable", err))?;
    let link = Arc::new(link);
    Ok(Collaborators {
        discovery: link.clone(),
        connector: link,
        credentials,
    })
}

#[cfg(not(feature = "ble"))]
async fn ble_collaborators(cli: &Cli, _credentials: Arc<PemDirectory>) -> CliResult<Collaborators> {
    let _ = cli.ble_scan_secs;
    Err(CliError::new(
        crate::exit::USAGE,
        "built without Bluetooth support; pass --simulation <NODE_ID> or rebuild with --features ble",
    ))
}
