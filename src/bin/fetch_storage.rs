use clap::Parser;
use hedera_toolkit::config::{load_dotenv, ToolkitConfig};
use hedera_toolkit::core::storage_dump::{self, DumpFormat};
use hedera_toolkit::utils::logger;
use hedera_toolkit::MirrorNodeClient;

#[derive(Parser)]
#[command(name = "fetch-storage")]
#[command(about = "Dump a contract's storage slots from a Hedera mirror node")]
struct Args {
    /// Contract ID (0.0.x) or EVM address
    contract: String,

    /// Network name (mainnet, testnet, previewnet, solo, local) or a mirror node URL
    #[arg(short, long, default_value = "solo")]
    network: String,

    /// Print the entries as Yul `sstore` statements
    #[arg(short, long)]
    yul: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: &Args) -> hedera_toolkit::Result<String> {
    let config = ToolkitConfig::load(args.config.as_deref())?;
    let mirror = MirrorNodeClient::new(config.resolve_mirror_node(&args.network)?);
    tracing::debug!("🌐 Mirror node: {}", mirror.base_url());

    let state = storage_dump::fetch_storage(&mirror, &args.contract).await?;
    let format = if args.yul { DumpFormat::Yul } else { DumpFormat::Json };
    storage_dump::render(&state, format)
}

#[tokio::main]
async fn main() {
    load_dotenv();
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    match run(&args).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
