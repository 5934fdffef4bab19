// Command-line surface. With no subcommand the binary starts the interactive
// menu; each subcommand maps to a handler in `commands`.

use clap::{value_parser, Arg, ArgMatches, Command};

pub fn build_cli() -> Command {
    Command::new("ytrss")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert YouTube videos to audio and add them to your private podcast feeds")
        .long_about("A terminal client for the yt-rss service. Run without a subcommand for the interactive menu: pick a podcast, paste a URL and watch the conversion until it finishes.")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Base URL of the API (overrides config)"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .global(true)
                .value_parser(value_parser!(u64).range(1..))
                .help("Seconds between status checks while polling"),
        )
        .subcommand(
            Command::new("auth")
                .about("Store the API key used for all requests")
                .arg(
                    Arg::new("key")
                        .long("key")
                        .short('k')
                        .help("API key to store (prompted for when omitted)"),
                ),
        )
        .subcommand(Command::new("usage").about("Display storage usage"))
        .subcommand(Command::new("jobs").about("List all conversion jobs"))
        .subcommand(
            Command::new("create")
                .about("Create a conversion job")
                .arg(
                    Arg::new("url")
                        .help("Video URL to convert")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("download")
                .about("Download the audio file for a completed job")
                .arg(
                    Arg::new("job-id")
                        .help("ID of a job with status SUCCESS")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("open").about("Open the downloads directory"))
        .subcommand(
            Command::new("poll")
                .about("Watch an item until its conversion finishes")
                .arg(
                    Arg::new("item-id")
                        .help("ID returned when the URL was added")
                        .required(true)
                        .index(1),
                ),
        )
}

pub fn get_matches() -> ArgMatches {
    build_cli().get_matches()
}
