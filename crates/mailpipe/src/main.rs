//! mailpipe: watch an IMAP mailbox, render each new message through a
//! text template to stdout, and delete what was processed.
//!
//! Delivery semantics are deliberately asymmetric: a message whose render
//! fails is still deleted (lost), while a crash before cleanup leaves
//! messages to be reprocessed on the next run (duplicated). There is no
//! retry and no state on disk; the mailbox itself is the cursor.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod extract;
mod pipeline;
mod record;
mod render;
mod watch;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = pipeline::run(&args).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}
