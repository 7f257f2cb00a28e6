use crate::CLAP_STYLING;
use arachne::parse_url_arg;
use arachne_core::protocol::DEFAULT_ADDR;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("arachne")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("arachne")
        .about("Controls a running arachne-server: start, stop and list crawls")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress progress spinners and decorations").required(false))
        .arg(
            arg!(-a --"addr" <ADDR>)
                .required(false)
                .global(true)
                .help("Address of the crawl server")
                .default_value(DEFAULT_ADDR),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("start")
                .about("Start crawling a site; only links under the start URL are followed")
                .arg(
                    arg!(<URL>)
                        .help("Start URL, e.g. www.example.com (https:// is assumed)")
                        .value_parser(parse_url_arg),
                ),
        )
        .subcommand(
            command!("stop")
                .about("Stop the running crawl")
                .arg(
                    arg!(<URL>)
                        .help("URL of the crawl to stop")
                        .value_parser(parse_url_arg),
                ),
        )
        .subcommand(
            command!("list")
                .about("List the site tree of crawled pages")
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(command!("status").about("Show the state of the current crawl"))
}
