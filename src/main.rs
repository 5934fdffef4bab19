// Entrypoint for the CLI application.
// - Keeps `main` small: resolve config and the API key, build the client,
//   then dispatch to a subcommand or the interactive menu.
// - Returns `anyhow::Result` so every error is printed the same way.

use anyhow::{Context, Result};
use clap::ArgMatches;
use ytrss_cli::api::ApiClient;
use ytrss_cli::config::Config;
use ytrss_cli::credentials::{env_key, CredentialStore};
use ytrss_cli::{cli, commands, logging, ui};

fn main() -> Result<()> {
    let matches = cli::get_matches();
    let sub = matches.subcommand();
    // Global flags land on whichever command they were written after.
    let scoped = sub.map(|(_, m)| m).unwrap_or(&matches);

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(url) = global::<String>(scoped, &matches, "api-url") {
        config = config.with_api_url(url);
    }
    if let Some(secs) = global::<u64>(scoped, &matches, "interval") {
        config = config.with_poll_interval_secs(secs)?;
    }
    logging::init_logging(&config.log_level);
    tracing::debug!(api_url = %config.api_url, "starting");

    let env = |key: &str| std::env::var(key).ok();
    let credentials = CredentialStore::default_location();
    let token = match &credentials {
        Ok(store) => store.load_or_warn(env),
        Err(e) => {
            tracing::warn!(error = %e, "no place to store the API key");
            env_key(env)
        }
    };
    let mut api = ApiClient::from_config(&config)?.with_token(token);

    match sub {
        None => ui::main_menu(api, &config, &credentials?),
        Some(("auth", m)) => commands::handle_auth(
            &mut api,
            &credentials?,
            m.get_one::<String>("key").map(String::as_str),
        ),
        Some(("usage", _)) => commands::handle_usage(&api),
        Some(("jobs", _)) => commands::handle_jobs(&api),
        Some(("create", m)) => commands::handle_create(&api, required(m, "url")?),
        Some(("download", m)) => {
            commands::handle_download(&api, required(m, "job-id")?, &config.downloads_dir)
        }
        Some(("open", _)) => commands::handle_open(&config.downloads_dir),
        Some(("poll", m)) => {
            commands::handle_poll(&api, required(m, "item-id")?, config.poll_interval)
        }
        Some((other, _)) => anyhow::bail!("Unknown command: {}", other),
    }
}

fn global<T: Clone + Send + Sync + 'static>(
    scoped: &ArgMatches,
    top: &ArgMatches,
    id: &str,
) -> Option<T> {
    scoped
        .get_one::<T>(id)
        .or_else(|| top.get_one::<T>(id))
        .cloned()
}

fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{}>", id))
}
