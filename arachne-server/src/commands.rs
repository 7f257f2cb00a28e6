use arachne_core::CrawlOptions;
use arachne_core::protocol::DEFAULT_PORT;
use arachne_scanner::fetcher::DEFAULT_USER_AGENT;
use arachne_scanner::{FetchOptions, LinkPolicy};
use clap::{ArgMatches, arg};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("arachne-server")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("arachne-server")
        .about("Runs same-site crawls on request from the arachne client")
        .styles(CLAP_STYLING)
        .arg(
            arg!(--"host" <HOST>)
                .required(false)
                .help("Address to listen on")
                .default_value("127.0.0.1"),
        )
        .arg(
            arg!(-p --"port" <PORT>)
                .required(false)
                .help("Port to listen on")
                .value_parser(clap::value_parser!(u16))
                .default_value("50051"),
        )
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .help("Per-page fetch timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"user-agent" <AGENT>)
                .required(false)
                .help("User-Agent header sent with every page fetch")
                .default_value(DEFAULT_USER_AGENT),
        )
        .arg(
            arg!(--"max-redirects" <COUNT>)
                .required(false)
                .help("Redirects followed per page before giving up")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            arg!(--"raw-links")
                .required(false)
                .help("Compare href values as written instead of resolving them against the page"),
        )
        .arg(arg!(-v --"verbose" ... "Increase log verbosity (-v, -vv, -vvv)").required(false))
}

/// `host:port` to bind.
pub fn bind_address(matches: &ArgMatches) -> String {
    let host = matches
        .get_one::<String>("host")
        .map(String::as_str)
        .unwrap_or("127.0.0.1");
    let port = matches
        .get_one::<u16>("port")
        .copied()
        .unwrap_or(DEFAULT_PORT);
    format!("{}:{}", host, port)
}

pub fn crawl_options(matches: &ArgMatches) -> CrawlOptions {
    let defaults = FetchOptions::default();

    let fetch = FetchOptions {
        user_agent: matches
            .get_one::<String>("user-agent")
            .cloned()
            .unwrap_or(defaults.user_agent),
        timeout_secs: matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(defaults.timeout_secs),
        max_redirects: matches
            .get_one::<usize>("max-redirects")
            .copied()
            .unwrap_or(defaults.max_redirects),
    };

    let link_policy = if matches.get_flag("raw-links") {
        LinkPolicy::Raw
    } else {
        LinkPolicy::Resolve
    };

    CrawlOptions { fetch, link_policy }
}

/// Default filter for a `-v` count. `RUST_LOG` takes precedence when set.
pub fn default_log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "info,arachne_server=debug,arachne_core=debug,arachne_scanner=debug",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter(verbosity).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
