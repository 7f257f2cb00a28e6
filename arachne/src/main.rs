use anyhow::{Context, Result, anyhow};
use arachne::{RpcClient, handle_list, handle_start, handle_status, handle_stop};
use arachne_core::ReportFormat;
use arachne_core::protocol::DEFAULT_ADDR;
use arachne_core::report::ListingWriter;
use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use std::io;
use tracing_subscriber::EnvFilter;

mod commands;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let chosen_command = command_argument_builder().get_matches();

    if let Err(e) = run(&chosen_command).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(chosen_command: &ArgMatches) -> Result<()> {
    let quiet = chosen_command.get_flag("quiet");
    let addr = chosen_command
        .get_one::<String>("addr")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ADDR);

    let client = RpcClient::new(addr).context("Failed to set up HTTP client")?;

    match chosen_command.subcommand() {
        Some(("start", primary_command)) => {
            let url = required_url(primary_command)?;
            handle_start(&client, url, quiet)
                .await
                .context("Could not start web crawler")?;
        }
        Some(("stop", primary_command)) => {
            let url = required_url(primary_command)?;
            handle_stop(&client, url, quiet)
                .await
                .context("Could not stop web crawler")?;
        }
        Some(("list", primary_command)) => {
            let format = primary_command
                .get_one::<String>("format")
                .and_then(|f| ReportFormat::parse(f))
                .unwrap_or_default();
            handle_list(&client, ListingWriter::new(io::stdout(), format))
                .await
                .context("Could not list site tree")?;
        }
        Some(("status", _)) => handle_status(&client)
            .await
            .context("Could not fetch crawl status")?,
        _ => unreachable!("clap should ensure we don't get here"),
    }

    Ok(())
}

fn required_url(args: &ArgMatches) -> Result<&String> {
    args.get_one::<String>("URL")
        .ok_or_else(|| anyhow!("missing URL argument"))
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
