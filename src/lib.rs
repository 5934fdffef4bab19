// Library root
// -----------
// This crate exposes the pieces of the `ytrss` terminal client. The binary
// (`main.rs`) parses arguments, loads config and the stored API key, then
// hands off to either a one-shot command or the interactive app.
//
// Module responsibilities:
// - `api`: HTTP calls to the conversion service behind the `PodcastApi` trait.
// - `models`: JSON shapes exchanged with the service.
// - `poller`: the poll-until-terminal contract for a submitted item.
// - `app`: the screen state machine (messages in, commands out).
// - `runtime`: executes commands and runs the message loop.
// - `ui`: terminal prompts, spinner and the key-watching poll wait.
// - `cli` / `commands`: argument parsing and the one-shot subcommands.
// - `config`, `credentials`, `logging`, `error`, `format`: ambient plumbing.
pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod poller;
pub mod runtime;
pub mod ui;
