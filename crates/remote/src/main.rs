// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pk-remote: reference ledger server for the pocket sync client.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pk_remote::{Ledger, ServerState};

/// pk-remote: Ledger server for pocket clients
#[derive(Parser, Debug)]
#[command(name = "pk-remote")]
#[command(about = "Reference ledger server for the pocket sync client")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Path of the ledger database
    #[arg(short, long, default_value = "ledger.db")]
    db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pk-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Ledger: {}", args.db.display());

    let state = ServerState::new(Ledger::open(&args.db)?);
    pk_remote::run(args.bind, state).await?;

    Ok(())
}
