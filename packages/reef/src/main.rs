use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

mod chat;
mod cli;
mod config;
mod session_store;
mod ws;

use crate::config::ReefConfig;

#[derive(Parser)]
#[command(name = "reef")]
#[command(about = "Terminal client for the Reef forum and chat services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom data directory (defaults to ~/.reef)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register(RegisterArgs),

    /// Log in and persist the session
    Login(LoginArgs),

    /// Forget the persisted session
    Logout,

    /// Show who is currently logged in
    Whoami,

    /// Show the post feed
    Posts,

    /// Create a new post
    Compose(ComposeArgs),

    /// Delete one of your posts
    Delete(DeleteArgs),

    /// Join the live chat
    Chat,
}

#[derive(Parser)]
struct RegisterArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,

    #[arg(long)]
    email: String,
}

#[derive(Parser)]
struct LoginArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,
}

#[derive(Parser)]
struct ComposeArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    content: String,
}

#[derive(Parser)]
struct DeleteArgs {
    /// Post ID as shown in the feed
    id: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_env("REEF_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reef=info,warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let config = ReefConfig::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Register(args) => {
            cli::account::register(&config, args.username, args.password, args.email).await
        }
        Commands::Login(args) => cli::account::login(&config, args.username, args.password).await,
        Commands::Logout => cli::account::logout(&config),
        Commands::Whoami => cli::account::whoami(&config),
        Commands::Posts => cli::posts::feed(&config).await,
        Commands::Compose(args) => cli::posts::compose(&config, args.title, args.content).await,
        Commands::Delete(args) => cli::posts::delete(&config, args.id).await,
        Commands::Chat => cli::chat::chat(&config).await,
    }
}
