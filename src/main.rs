use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hosts_server::catalog::{Catalog, load_default_hosts};
use hosts_server::lists::load_lists;
use hosts_server::server::{Server, ServerConfig, WORKERS};
use hosts_server::{Error, Result};

#[derive(Parser)]
#[command(name = "hosts-server")]
#[command(about = "Serves combined hosts-file block lists", long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    addr: IpAddr,

    /// Port to bind to
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Directory containing the hosts lists
    #[arg(short = 'd', long, default_value = "lists")]
    hosts_dir: PathBuf,

    /// Hosts file prepended to every block list (defaults to Ubuntu's stock hosts)
    #[arg(long)]
    default_hosts: Option<PathBuf>,

    /// Seconds a client may take to send its request (no limit if unset)
    #[arg(long)]
    read_timeout: Option<u64>,

    /// Log filter, used when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .init();
}

fn run(args: Args) -> Result<()> {
    let default_hosts = load_default_hosts(args.default_hosts.as_deref())?;
    let lists = load_lists(&args.hosts_dir)?;
    let catalog = Arc::new(Catalog::new(lists, default_hosts));

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.addr, args.port),
        read_timeout: args.read_timeout.map(Duration::from_secs),
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKERS)
        .thread_name("http-worker")
        .enable_all()
        .build()?;

    rt.block_on(async {
        let server = Server::bind(&config).await?;
        info!(addr = %config.bind_addr, workers = WORKERS, "starting http server");
        server.run(catalog).await;
        Ok::<(), Error>(())
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level);
    info!("starting");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ Error::ListsDirMissing(_)) => {
            error!("{e}. Path correct? Maybe fetch the lists first.");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
