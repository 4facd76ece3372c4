use clap::Parser;
use hedera_toolkit::config::cli::{Command, DeployTarget, HbarxAction};
use hedera_toolkit::config::{load_dotenv, require_env};
use hedera_toolkit::core::storage_dump::{self, DumpFormat};
use ethers::types::TransactionReceipt;
use hedera_toolkit::domain::model::{format_address, parse_address, parse_address_or_id};
use hedera_toolkit::utils::evm::{pair_address, parse_hash};
use hedera_toolkit::utils::{logger, validation::Validate};
use hedera_toolkit::{
    deploy_full, wallet_from_env, ArtifactStore, AssetsDeployer, BalanceReport, CliConfig,
    DeploymentStore, EntityId, HbarxClient, LocalStorage, MirrorNodeClient, RelayClient, Result,
    RpcDeployer, SaucerSwapDeployer, ToolkitConfig, YulCompiler,
};
use std::time::Duration;

#[tokio::main]
async fn main() {
    load_dotenv();
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::debug!(
            "Command failed: {:?} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    cli.validate()?;
    let config = ToolkitConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let network = cli.network.as_str();

    match &cli.command {
        Command::Storage { contract, yul } => {
            let mirror = MirrorNodeClient::new(config.resolve_mirror_node(network)?);
            let state = storage_dump::fetch_storage(&mirror, contract).await?;
            let format = if *yul { DumpFormat::Yul } else { DumpFormat::Json };
            println!("{}", storage_dump::render(&state, format)?);
        }
        Command::Account { id } => {
            let mirror = MirrorNodeClient::new(config.resolve_mirror_node(network)?);
            let account = mirror.fetch_account(id).await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Command::Token { id } => {
            let mirror = MirrorNodeClient::new(config.resolve_mirror_node(network)?);
            let token = mirror.fetch_token(id).await?;
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
        Command::Deploy { target } => {
            let rpc = relay_client(&config, network, "PRIVATE_KEY").await?;
            let deployer = RpcDeployer::new(rpc, ArtifactStore::new(&config.artifacts.directory));
            let store = DeploymentStore::new(LocalStorage::new(&config.deployments.directory));

            match target {
                DeployTarget::Assets => {
                    let record = AssetsDeployer::new(&deployer, &store, network)
                        .deploy_whbar()
                        .await?;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                DeployTarget::Saucerswap { version } => {
                    let record = SaucerSwapDeployer::new(&deployer, &store, network)
                        .deploy(version)
                        .await?;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                DeployTarget::Full => {
                    let (assets, saucerswap) = deploy_full(&deployer, &store, network).await?;
                    println!("{}", serde_json::to_string_pretty(&assets)?);
                    println!("{}", serde_json::to_string_pretty(&saucerswap)?);
                }
            }
        }
        Command::Deployments { app, version } => {
            let store = DeploymentStore::new(LocalStorage::new(&config.deployments.directory));
            let record = store.load(app, version, network).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::CompileYul { file } => {
            let bytecode = YulCompiler::new(&config.compiler.solc).compile_file(file).await?;
            println!("{}", bytecode);
        }
        Command::PairAddress {
            factory,
            token_a,
            token_b,
            init_code_hash,
        } => {
            let pair = pair_address(
                &parse_address_or_id(factory)?,
                &parse_address_or_id(token_a)?,
                &parse_address_or_id(token_b)?,
                &parse_hash(init_code_hash)?,
            );
            println!("{}", format_address(&pair));
        }
        Command::EntityId { value } => {
            let value = value.trim();
            if value.starts_with("0x") || value.starts_with("0X") {
                println!("{}", EntityId::from_evm_address(&parse_address(value)?)?);
            } else {
                println!("{}", format_address(&value.parse::<EntityId>()?.to_evm_address()));
            }
        }
        Command::Hbarx { action, account } => {
            run_hbarx(&config, network, action, account.as_deref()).await?;
        }
    }

    Ok(())
}

/// 以環境變數 `key_env` 中的私鑰連線到網路的 JSON-RPC relay
async fn relay_client(config: &ToolkitConfig, network: &str, key_env: &str) -> Result<RelayClient> {
    let wallet = wallet_from_env(key_env)?;
    let rpc = RelayClient::connect(&config.json_rpc_url(network)?, wallet).await?;
    Ok(rpc.with_receipt_polling(
        Duration::from_millis(config.rpc.receipt_poll_interval_ms),
        config.rpc.receipt_attempts,
    ))
}

async fn run_hbarx(
    config: &ToolkitConfig,
    network: &str,
    action: &HbarxAction,
    account: Option<&str>,
) -> Result<()> {
    let account = match account {
        Some(account) => account.to_string(),
        None => require_env("USER_ID")?,
    };

    let mirror = MirrorNodeClient::new(config.resolve_mirror_node(network)?);
    let rpc = relay_client(config, network, "USER_PK").await?;
    let client = HbarxClient::new(rpc, &config.hbarx)?;

    let address = mirror.resolve_evm_address(&account).await?;
    tracing::info!("👤 Account {} ({})", account, format_address(&address));
    if address != client.sender() {
        tracing::warn!(
            "⚠️ USER_PK signs as {}, not as account {}",
            format_address(&client.sender()),
            account
        );
    }

    print_balance(config, &mirror, &account).await?;
    println!("- Exchange Rate: {}", client.exchange_rate().await?);

    let receipt = match action {
        HbarxAction::Status => {
            println!("- Unbonding Time: {} seconds", client.unbonding_time().await?);
            return Ok(());
        }
        HbarxAction::Stake { amount } => client.stake(*amount).await?,
        HbarxAction::Unstake { amount } => client.unstake(*amount).await?,
        HbarxAction::Withdraw { index } => client.withdraw(*index).await?,
    };
    print_transaction_link(config, network, &receipt);

    print_balance(config, &mirror, &account).await
}

async fn print_balance(config: &ToolkitConfig, mirror: &MirrorNodeClient, account: &str) -> Result<()> {
    let info = mirror.fetch_account(account).await?;
    println!("{}", BalanceReport::from_account(&info, &config.hbarx.token_id));
    Ok(())
}

fn print_transaction_link(config: &ToolkitConfig, network: &str, receipt: &TransactionReceipt) {
    let hash = format!("{:#x}", receipt.transaction_hash);
    match config.explorer_transaction_url(network, &hash) {
        Some(url) => println!("Check your transaction at {}", url),
        None => println!("Transaction hash: {}", hash),
    }
}
