use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use wallet_session::observability::init_logging;
use wallet_session::provider::rpc::RpcProvider;
use wallet_session::{load_config, ChainId, Shutdown, WalletSession};

#[derive(Parser)]
#[command(name = "wallet-cli")]
#[command(about = "Demo CLI for the wallet session library", long_about = None)]
struct Cli {
    /// Path to the session config (TOML)
    #[arg(short, long, default_value = "session.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the active network and print the session snapshot
    Connect,
    /// Connect, then switch to another configured network
    Switch {
        #[arg(long)]
        chain_id: u64,
    },
    /// List the configured networks
    Networks,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability.log_level);

    if let Commands::Networks = cli.command {
        for network in &config.networks {
            println!("{:>10}  chain {}  {}", network.name, network.chain_id, network.rpc_url);
        }
        return Ok(());
    }

    let provider = Arc::new(RpcProvider::from_config(&config)?);
    let session = Arc::new(WalletSession::new(provider));

    let shutdown = Shutdown::new();
    let pump = tokio::spawn({
        let session = session.clone();
        let signal = shutdown.subscribe();
        async move { session.run(signal).await }
    });

    match cli.command {
        Commands::Connect => {
            let snapshot = session.connect().await?;
            print_snapshot(&snapshot)?;
        }
        Commands::Switch { chain_id } => {
            session.connect().await?;

            // The new chain arrives through the provider's event, not the
            // switch acknowledgment; watch the snapshot until it moves.
            let mut watch = session.watch();
            session.switch_network(ChainId(chain_id)).await?;
            while watch.borrow_and_update().chain_id() != Some(ChainId(chain_id)) {
                watch.changed().await?;
            }
            let snapshot = watch.borrow().clone();
            print_snapshot(&snapshot)?;
        }
        Commands::Networks => unreachable!("handled above"),
    }

    shutdown.trigger();
    pump.await?;
    Ok(())
}

fn print_snapshot(
    snapshot: &wallet_session::SessionSnapshot,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
