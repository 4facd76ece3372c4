use crate::utils::error::Result;
use crate::utils::validation::{validate_network_arg, validate_path, PathKind, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "hedera-toolkit")]
#[command(about = "Deployment, mirror node and staking utilities for Hedera")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to ./hedera-toolkit.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Network name from the configuration, or a mirror node URL for read-only commands
    #[arg(short, long, global = true, env = "HEDERA_NETWORK", default_value = "local")]
    pub network: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Dump a contract's storage from the mirror node
    Storage {
        /// Contract ID (0.0.x) or EVM address
        contract: String,
        /// Print the entries as Yul `sstore` statements
        #[arg(short, long)]
        yul: bool,
    },
    /// Look up an account by ID, alias or EVM address
    Account { id: String },
    /// Look up a token by ID or EVM address
    Token { id: String },
    /// Deploy contracts through the network's JSON-RPC relay (signed with PRIVATE_KEY)
    Deploy {
        #[command(subcommand)]
        target: DeployTarget,
    },
    /// Show a saved deployment record
    Deployments { app: String, version: String },
    /// Compile a Yul file and print its bytecode
    CompileYul { file: String },
    /// Predict an AMM pair address
    PairAddress {
        factory: String,
        token_a: String,
        token_b: String,
        #[arg(long)]
        init_code_hash: String,
    },
    /// Convert between entity IDs (0.0.x) and long-zero EVM addresses
    EntityId { value: String },
    /// HBARx staking commands (account from --account or USER_ID, signed with USER_PK)
    Hbarx {
        #[command(subcommand)]
        action: HbarxAction,
        #[arg(long, global = true)]
        account: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum DeployTarget {
    /// Deploy WHBAR
    Assets,
    /// Deploy the SaucerSwap factory and router
    Saucerswap {
        #[arg(long, env = "VERSION", default_value = "v1")]
        version: String,
    },
    /// Deploy assets and SaucerSwap V1
    Full,
}

#[derive(Debug, Clone, Subcommand)]
pub enum HbarxAction {
    /// Show balances, exchange rate and unbonding time
    Status,
    Stake {
        #[arg(long, default_value_t = 10)]
        amount: u64,
    },
    Unstake {
        #[arg(long, default_value_t = 10)]
        amount: u64,
    },
    Withdraw {
        #[arg(long)]
        index: u64,
    },
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_network_arg("network", &self.network)?;
        if let Some(config) = &self.config {
            validate_path("config", config, PathKind::File)?;
        }
        Ok(())
    }
}
