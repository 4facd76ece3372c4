use clap::Parser;
use hedera_toolkit::config::{load_dotenv, ToolkitConfig};
use hedera_toolkit::utils::error::ToolkitError;
use hedera_toolkit::utils::logger;
use hedera_toolkit::YulCompiler;

#[derive(Parser)]
#[command(name = "yulc")]
#[command(about = "Compile a stand-alone Yul file with solc and print its bytecode")]
struct Args {
    /// Yul source file
    file: String,

    /// solc binary (overrides `compiler.solc` from the configuration)
    #[arg(long, env = "SOLC")]
    solc: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: &Args) -> hedera_toolkit::Result<String> {
    let solc = match &args.solc {
        Some(solc) => solc.clone(),
        None => ToolkitConfig::load(args.config.as_deref())?.compiler.solc,
    };
    YulCompiler::new(solc).compile_file(&args.file).await
}

#[tokio::main]
async fn main() {
    load_dotenv();
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    match run(&args).await {
        Ok(bytecode) => println!("{}", bytecode),
        Err(ToolkitError::CompilationError { errors }) => {
            eprintln!("Compilation errors");
            for error in errors {
                eprintln!("{}", error);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
