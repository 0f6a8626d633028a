use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tinymta::config::SMTP_PORT;
use tinymta::{HickoryMxResolver, ServerConfig, SmtpServer};
use tracing::info;

/// Minimal SMTP mail transfer agent
#[derive(Parser, Debug)]
#[command(name = "tinymta")]
#[command(about = "Accept mail over SMTP, deliver locally or relay via MX", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:10001")]
    listen: String,

    /// Server name used in the greeting and when relaying
    #[arg(long, default_value = "localhost")]
    hostname: String,

    /// Recipients in this domain are delivered to local mailboxes
    #[arg(long, default_value = "localhost")]
    local_domain: String,

    /// Directory holding one mailbox file per local user
    #[arg(short, long, default_value = ".")]
    mailbox_dir: PathBuf,

    /// Port of remote mail exchangers
    #[arg(long, default_value_t = SMTP_PORT)]
    relay_port: u16,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tinymta::logging::init();

    let config = ServerConfig::new(&cli.hostname)
        .with_local_domain(&cli.local_domain)
        .with_mailbox_dir(cli.mailbox_dir)
        .with_relay_port(cli.relay_port);

    info!(
        hostname = %config.hostname,
        local_domain = %config.local_domain,
        mailbox_dir = %config.mailbox_dir.display(),
        "starting tinymta"
    );

    let resolver =
        HickoryMxResolver::from_system_conf().context("failed to read the system DNS configuration")?;
    let server = SmtpServer::new(config, Arc::new(resolver));

    server
        .start(&cli.listen)
        .with_context(|| format!("failed to serve on {}", cli.listen))
}
