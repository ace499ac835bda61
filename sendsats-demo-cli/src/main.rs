//! Sendsats Demo CLI
//!
//! Command-line interface for checking balances, inspecting fee rates, and
//! sending on-chain payments through the sendsats library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sendsats_lib::{
    get_balance, send_transaction, FeeRequest, FeeTier, Network, ProviderRegistry, SendOutcome,
    SendRequest,
};

#[derive(Parser)]
#[command(name = "sendsats-demo")]
#[command(about = "Sendsats Demo CLI - query balances, fees, and send bitcoin", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Network to operate on (mainnet or testnet)
    #[arg(long, global = true, default_value = "mainnet")]
    network: Network,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the confirmed balance of an address
    Balance {
        /// Address to query
        address: String,

        /// Named balance provider (defaults to the network default)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show the current fee rate for a tier
    Fees {
        /// Processing speed tier: fastest, halfHour, or hour
        #[arg(long, default_value = "fastest")]
        tier: FeeTier,

        /// Named fee provider (defaults to the network default)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Sign and optionally broadcast a payment
    Send {
        /// Sending address (its UTXOs fund the payment)
        from: String,

        /// Recipient address
        to: String,

        /// Amount in satoshis (the miner fee is deducted from this)
        amount_sats: u64,

        /// Fee tier to use when --fee-rate is not given
        #[arg(long, default_value = "fastest", conflicts_with = "fee_rate")]
        tier: FeeTier,

        /// Explicit fee rate in sat/byte, bypassing the fee provider
        #[arg(long)]
        fee_rate: Option<f64>,

        /// Confirmations a UTXO needs before it can be spent
        #[arg(long, default_value_t = sendsats_lib::DEFAULT_MIN_CONFIRMATIONS)]
        min_confirmations: u64,

        /// Sign the transaction but print the hex instead of broadcasting
        #[arg(long)]
        dry_run: bool,

        /// Named fee provider
        #[arg(long)]
        fee_provider: Option<String>,

        /// Named UTXO provider
        #[arg(long)]
        utxo_provider: Option<String>,

        /// Named broadcast provider
        #[arg(long)]
        broadcast_provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sendsats_demo_cli=debug,sendsats_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("sendsats_demo_cli=info,sendsats_lib=warn")
            .init();
    }

    let registry = ProviderRegistry::with_defaults().context("failed to set up providers")?;

    match cli.command {
        Commands::Balance { address, provider } => {
            let btc = get_balance(&registry, &address, cli.network, provider.as_deref())
                .await
                .context("balance lookup failed")?;
            println!("{btc} BTC");
        }
        Commands::Fees { tier, provider } => {
            let backend = registry.fee_provider(cli.network, provider.as_deref())?;
            let rate = sendsats_lib::resolve_fee_rate(&FeeRequest::Tier(tier), backend.as_ref())
                .await
                .context("fee lookup failed")?;
            println!("{tier}: {rate} sat/byte");
        }
        Commands::Send {
            from,
            to,
            amount_sats,
            tier,
            fee_rate,
            min_confirmations,
            dry_run,
            fee_provider,
            utxo_provider,
            broadcast_provider,
        } => {
            let wif = rpassword::prompt_password("Private key (WIF): ")
                .context("failed to read private key")?;

            let fee = match fee_rate {
                Some(rate) => FeeRequest::Rate(rate),
                None => FeeRequest::Tier(tier),
            };

            let mut request = SendRequest::new(from, to, amount_sats, wif)
                .with_network(cli.network)
                .with_fee(fee)
                .with_min_confirmations(min_confirmations);
            if dry_run {
                request = request.dry_run();
            }
            if let Some(name) = fee_provider {
                request = request.with_fee_provider(name);
            }
            if let Some(name) = utxo_provider {
                request = request.with_utxo_provider(name);
            }
            if let Some(name) = broadcast_provider {
                request = request.with_broadcast_provider(name);
            }

            tracing::info!(network = %cli.network, amount_sats, dry_run, "sending payment");
            match send_transaction(&registry, request).await? {
                SendOutcome::DryRun { tx_hex } => {
                    tracing::info!(bytes = tx_hex.len() / 2, "dry run complete");
                    println!("signed transaction (not broadcast):");
                    println!("{tx_hex}");
                }
                SendOutcome::Broadcast { ack, .. } => {
                    tracing::info!(%ack, "broadcast accepted");
                    println!("broadcast accepted: {ack}");
                }
            }
        }
    }

    Ok(())
}
