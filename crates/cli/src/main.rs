//! Host-shim harness for the resolution engine.
//!
//! The real host integration (a DNS-wire listener that calls into
//! `Resolve{Ip,Hostname,Autoscaler}` per query and emits resource records)
//! is out of scope for this workspace — see `skyfleet_dns_domain`'s
//! module docs. This binary exercises the engine the way that shim would:
//! it loads config, wires the engine and background refresher, and offers
//! a one-shot command surface plus a small stdin-driven REPL for manual
//! testing.

mod bootstrap;
mod di;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use skyfleet_dns_domain::config::CliOverrides;
use skyfleet_dns_jobs::{JobRunner, RefresherJob};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Positional host args mirror spec §6's `[_, zoneName, vpcCidr, accountName]`.
#[derive(Parser)]
#[command(name = "skyfleet-dns")]
#[command(version)]
#[command(about = "Dynamically-loaded authoritative DNS back-end for cloud compute instances")]
struct Cli {
    /// DNS zone served, e.g. "aws.example.com." (with or without trailing dot).
    zone_name: String,
    /// VPC CIDR the reverse-zone helper enumerates (mask must be /8..=/24).
    vpc_cidr: String,
    /// Account/tenant name used in hostname composition.
    account_name: String,

    /// Path to the JSON config file.
    #[arg(long, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the background refresher and serve queries from stdin until EOF, then block on Ctrl-C.
    Serve,
    /// `ResolveIp` — forward lookup of an instanceId.
    ResolveIp { instance_id: String, client_addr: String },
    /// `ResolveHostname` — reverse lookup of a private IPv4.
    ResolveHostname { ip: String, client_addr: String },
    /// `ResolveAutoscaler` — ASG alias lookup.
    ResolveAutoscaler { alias: String, client_addr: String },
    /// Classify a DNS name against the configured forward/autoscaler/reverse zones.
    ClassifyZone { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        zone_name: Some(cli.zone_name.clone()),
        vpc_cidr: Some(cli.vpc_cidr.clone()),
        account_name: Some(cli.account_name.clone()),
    };
    let config = bootstrap::load_config(&cli.config, overrides)?;
    bootstrap::init_logging(&config.logging);

    let services = di::Services::build(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_serve(services, config.engine.refresh_interval_secs).await,
        Command::ResolveIp { instance_id, client_addr } => {
            let (ip, ok) = services.engine.resolve_ip(&instance_id, &client_addr).await;
            print_result(ok, ip);
            Ok(())
        }
        Command::ResolveHostname { ip, client_addr } => {
            let (hostname, ok) = services.engine.resolve_hostname(&ip, &client_addr).await;
            print_result(ok, hostname);
            Ok(())
        }
        Command::ResolveAutoscaler { alias, client_addr } => {
            let (ips, ok) = services.engine.resolve_autoscaler(&alias, &client_addr).await;
            print_result(ok, (!ips.is_empty()).then_some(ips));
            Ok(())
        }
        Command::ClassifyZone { name } => {
            println!(
                "{}",
                serde_json::json!({
                    "forward": services.engine.is_forward_zone(&name),
                    "autoscaler": services.engine.is_autoscaler_zone(&name),
                    "reverse": services.engine.is_reverse_zone(&name),
                })
            );
            Ok(())
        }
    }
}

fn print_result<T: serde::Serialize>(ok: bool, value: Option<T>) {
    println!("{}", serde_json::json!({ "ok": ok, "value": value }));
}

/// Starts the background refresher and serves lines from stdin of the
/// form `ip|ptr|asg <key> <clientAddr>` until EOF, then idles until
/// Ctrl-C triggers a clean shutdown of the refresher.
async fn run_serve(services: di::Services, refresh_interval_secs: u64) -> anyhow::Result<()> {
    let refresher = RefresherJob::new(Arc::clone(&services.engine), refresh_interval_secs);
    JobRunner::new().with_refresher(refresher).start().await;

    info!("engine ready, reading queries from stdin (ip|ptr|asg <key> <clientAddr>)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => handle_query_line(&services, &line).await,
                    Ok(None) => {
                        info!("stdin closed, serving until Ctrl-C");
                        tokio::signal::ctrl_c().await.ok();
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "error reading stdin");
                        break;
                    }
                }
            }
        }
    }

    services.engine.request_shutdown();
    for stat in services.stats.get_all() {
        info!(counter = stat.0, value = stat.1, "final stat");
    }
    Ok(())
}

async fn handle_query_line(services: &di::Services, line: &str) {
    let mut parts = line.split_whitespace();
    let (kind, key, client_addr) = (parts.next(), parts.next(), parts.next());
    match (kind, key, client_addr) {
        (Some("ip"), Some(key), Some(client_addr)) => {
            let (ip, ok) = services.engine.resolve_ip(key, client_addr).await;
            print_result(ok, ip);
        }
        (Some("ptr"), Some(key), Some(client_addr)) => {
            let (hostname, ok) = services.engine.resolve_hostname(key, client_addr).await;
            print_result(ok, hostname);
        }
        (Some("asg"), Some(key), Some(client_addr)) => {
            let (ips, ok) = services.engine.resolve_autoscaler(key, client_addr).await;
            print_result(ok, (!ips.is_empty()).then_some(ips));
        }
        _ => warn!(%line, "unrecognized query line, expected 'ip|ptr|asg <key> <clientAddr>'"),
    }
}
