//! satchel: command-line interface for the Satchel wallet.
//!
//! One-shot subcommands for scripting, plus an interactive menu (the
//! default) that asks for the ledger endpoint and a wallet, then loops over
//! Address / Balance / Send / Exit.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use satchel_core::traits::LedgerService;
use satchel_wallet::{Wallet, WalletConfig};

/// Satchel command-line wallet.
#[derive(Parser)]
#[command(name = "satchel")]
#[command(version, about = "Single-key UTXO wallet for a remote ledger")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Ledger endpoint URL (env: SATCHEL_RPC_ENDPOINT).
    #[arg(long, global = true)]
    rpc_endpoint: Option<String>,

    /// Directory holding wallet key files (env: SATCHEL_WALLET_DIR).
    #[arg(long, global = true)]
    wallet_dir: Option<PathBuf>,

    /// Per-request timeout in seconds (env: SATCHEL_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl GlobalArgs {
    /// Overlay command-line flags on `config`.
    fn apply(self, config: &mut WalletConfig) -> Result<()> {
        if let Some(endpoint) = self.rpc_endpoint {
            config.rpc_endpoint = endpoint;
        }
        if let Some(dir) = self.wallet_dir {
            config.wallet_dir = dir;
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                bail!("--timeout-secs must be positive");
            }
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key and save it under NAME.
    Create {
        /// Wallet name.
        name: String,
    },
    /// Show a wallet's receive address.
    Address {
        /// Wallet name.
        name: String,
    },
    /// Query a wallet's balance from the ledger.
    Balance {
        /// Wallet name.
        name: String,
    },
    /// Send coins to an address.
    Send(SendArgs),
    /// Interactive menu (default).
    Menu,
}

#[derive(Args)]
struct SendArgs {
    /// Wallet name.
    name: String,

    /// Recipient address (Base58Check).
    #[arg(long)]
    to: String,

    /// Amount to send.
    #[arg(long)]
    amount: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = WalletConfig::from_env().context("Invalid environment configuration")?;
    cli.global.apply(&mut config)?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Create { name } => cmd_create(&config, &name),
        Commands::Address { name } => cmd_address(&config, &name),
        Commands::Balance { name } => cmd_balance(&config, &name),
        Commands::Send(args) => cmd_send(&config, args),
        Commands::Menu => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            run_menu(config, &mut input, &mut out)
        }
    }
}

fn cmd_create(config: &WalletConfig, name: &str) -> Result<()> {
    let store = config.key_store();
    let wallet = Wallet::create(&store, name)
        .with_context(|| format!("Failed to create wallet {name:?}"))?;
    println!("Wallet {name:?} saved in {}", store.dir().display());
    println!("Address: {}", wallet.address());
    Ok(())
}

fn cmd_address(config: &WalletConfig, name: &str) -> Result<()> {
    let wallet = open_wallet(config, name)?;
    println!("{}", wallet.address());
    Ok(())
}

fn cmd_balance(config: &WalletConfig, name: &str) -> Result<()> {
    let wallet = open_wallet(config, name)?;
    let ledger = config.ledger_client().context("Failed to build ledger client")?;
    let balance = wallet
        .balance(&ledger)
        .with_context(|| format!("Balance query to {} failed", config.rpc_endpoint))?;
    println!("{balance}");
    Ok(())
}

fn cmd_send(config: &WalletConfig, args: SendArgs) -> Result<()> {
    let wallet = open_wallet(config, &args.name)?;
    let ledger = config.ledger_client().context("Failed to build ledger client")?;
    let txid = wallet
        .send(&ledger, &args.to, args.amount)
        .with_context(|| format!("Failed to send {} to {}", args.amount, args.to))?;
    println!("Sent {} to {}", args.amount, args.to);
    println!("Transaction ID: {txid}");
    Ok(())
}

fn open_wallet(config: &WalletConfig, name: &str) -> Result<Wallet> {
    Wallet::open(&config.key_store(), name)
        .with_context(|| format!("Failed to open wallet {name:?}"))
}

// --- Interactive menu ---

/// Print `message` and read one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line).context("Failed to read input")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn run_menu<R: BufRead, W: Write>(
    mut config: WalletConfig,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Welcome to the Satchel wallet!")?;

    let message = format!("Enter the RPC endpoint [{}]: ", config.rpc_endpoint);
    if let Some(endpoint) = prompt(input, out, &message)?.filter(|e| !e.is_empty()) {
        config.rpc_endpoint = endpoint;
    }
    writeln!(out, "Using RPC endpoint: {}", config.rpc_endpoint)?;

    let store = config.key_store();
    let choice = prompt(
        input,
        out,
        "Do you want to create a new wallet or use an existing one? (new/existing): ",
    )?
    .unwrap_or_default();

    let wallet = match choice.as_str() {
        "new" => {
            let name = prompt(input, out, "Enter a name for your new wallet: ")?.unwrap_or_default();
            let wallet = Wallet::create(&store, &name)
                .with_context(|| format!("Failed to create wallet {name:?}"))?;
            writeln!(out, "New wallet created and saved.")?;
            wallet
        }
        "existing" => {
            let name =
                prompt(input, out, "Enter the name of your existing wallet: ")?.unwrap_or_default();
            let wallet = Wallet::open(&store, &name)
                .with_context(|| format!("Failed to open wallet {name:?}"))?;
            writeln!(out, "Wallet loaded successfully.")?;
            wallet
        }
        other => bail!("Invalid choice {other:?} (expected \"new\" or \"existing\")"),
    };

    let ledger = config.ledger_client().context("Failed to build ledger client")?;
    menu_loop(&wallet, &ledger, input, out)
}

/// Address / Balance / Send / Exit loop. Operation errors are printed and
/// the loop continues; end of input exits.
fn menu_loop<R: BufRead, W: Write>(
    wallet: &Wallet,
    ledger: &dyn LedgerService,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        writeln!(out)?;
        writeln!(out, "Choose an option:")?;
        writeln!(out, "1. Address")?;
        writeln!(out, "2. Balance")?;
        writeln!(out, "3. Send")?;
        writeln!(out, "4. Exit")?;

        let Some(choice) = prompt(input, out, "Enter your choice: ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => writeln!(out, "Your address: {}", wallet.address())?,
            "2" => match wallet.balance(ledger) {
                Ok(balance) => writeln!(out, "Your current balance: {balance}")?,
                Err(e) => writeln!(out, "Error: {e}")?,
            },
            "3" => {
                let to = prompt(input, out, "Enter the address to send to: ")?.unwrap_or_default();
                let amount = prompt(input, out, "Enter the amount to send: ")?.unwrap_or_default();
                let Ok(amount) = amount.parse::<u64>() else {
                    writeln!(out, "Error: invalid amount {amount:?}")?;
                    continue;
                };
                match wallet.send(ledger, &to, amount) {
                    Ok(txid) => writeln!(out, "Sent {amount} to {to} (transaction {txid})")?,
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
            "4" => {
                writeln!(out, "Exiting...")?;
                return Ok(());
            }
            _ => writeln!(out, "Invalid choice, please try again.")?,
        }
    }
}
