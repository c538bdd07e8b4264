use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod config;
mod convert;
mod info;
mod models;
mod parse;
mod registry;

#[derive(Parser)]
#[command(name = "mensura")]
#[command(about = "Convert values between physical units", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a value from one unit to another
    #[command(alias = "c")]
    Convert(convert::ConvertArgs),

    /// Describe a unit expression
    #[command(alias = "i")]
    Info(info::InfoArgs),

    /// List the built-in dimensional models
    Models(models::ModelsArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides the default filter
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Convert(args) => convert::execute(args),
        Commands::Info(args) => info::execute(args),
        Commands::Models(args) => models::execute(args),
    }
}
