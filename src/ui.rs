// UI layer: renders the current screen with `dialoguer` prompts, shows an
// `indicatif` spinner while a command runs, and watches the keyboard with
// `crossterm` while waiting between polls so the user can stop watching.

use crate::api::{ApiClient, PodcastApi};
use crate::app::{AfterPoll, App, Cmd, MenuAction, Msg, Screen};
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::format;
use crate::poller::{PollOutcome, Waiter};
use crate::runtime::{run_loop, Effects};
use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{self, Clear, ClearType};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{stdout, IsTerminal};
use std::time::{Duration, Instant};

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Run the interactive app until the user exits.
pub fn main_menu(mut api: ApiClient, config: &Config, credentials: &CredentialStore) -> Result<()> {
    let has_key = api.has_token();
    let mut app = App::new(config.poll_interval);
    let mut waiter = KeyWaiter::default();
    let mut effects = Effects {
        api: &mut api,
        credentials,
        downloads_dir: &config.downloads_dir,
        waiter: &mut waiter,
    };

    run_loop(&mut app, Msg::ApiKeyChecked(has_key), prompt, |app, cmd| {
        let spinner = spinner(&progress_text(app, &cmd));
        effects.waiter.spinner = Some(spinner.clone());
        let msg = effects.run(cmd);
        effects.waiter.spinner = None;
        spinner.finish_and_clear();
        msg
    })
}

/// Spinner used while a request is in flight.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.tick();
    spinner
}

fn progress_text(app: &App, cmd: &Cmd) -> String {
    match cmd {
        Cmd::PollItem { item_id, .. } => {
            let status = app
                .poll_state()
                .and_then(|p| p.last_status())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "submitted".to_string());
            format!(
                "Polling item {}... Status: {}  (q: stop watching)",
                item_id, status
            )
        }
        other => other.describe(),
    }
}

/// Ask the user for the next message on the current screen.
fn prompt(app: &App) -> Result<Msg> {
    clear_screen();
    render_notices(app);

    let msg = match app.screen() {
        Screen::SetApiKey => {
            println!("{}\n", "Set API Key".bold().magenta());
            let key: String = Input::new()
                .with_prompt("API key (leave empty to go back)")
                .allow_empty(true)
                .interact_text()?;
            if key.trim().is_empty() {
                Msg::Back
            } else {
                Msg::ApiKeyEntered(key)
            }
        }
        Screen::MainMenu => {
            if let Some(usage) = app.usage() {
                println!("{}\n", format::format_usage(usage).dark_grey());
            }
            let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();
            match Select::new()
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact_opt()?
            {
                Some(i) => Msg::Menu(MenuAction::ALL[i]),
                None => Msg::Quit,
            }
        }
        Screen::SelectPodcast => {
            let names: Vec<&str> = app.podcasts().iter().map(|p| p.name.as_str()).collect();
            match Select::new()
                .with_prompt("Select a podcast (Esc: back)")
                .items(&names)
                .default(0)
                .interact_opt()?
            {
                Some(i) => Msg::PodcastChosen(i),
                None => Msg::Back,
            }
        }
        Screen::EnterUrl | Screen::EnterConvertUrl => {
            let title = match app.selected_podcast() {
                Some(p) if app.screen() == Screen::EnterUrl => format!("Add URL to: {}", p.name),
                _ => "Convert a URL".to_string(),
            };
            println!("{}\n", title.bold().magenta());
            let url: String = Input::new()
                .with_prompt("YouTube URL (leave empty to go back)")
                .allow_empty(true)
                .interact_text()?;
            if url.trim().is_empty() {
                Msg::Back
            } else {
                Msg::UrlEntered(url)
            }
        }
        // Polling is driven by queued commands; reaching a prompt here
        // means the chain was broken, so leave the screen.
        Screen::Polling => Msg::PollStopped,
        Screen::PostPolling => {
            if let Some(outcome) = app.outcome() {
                render_outcome(outcome);
            }
            let labels: Vec<&str> = AfterPoll::ALL.iter().map(|a| a.label()).collect();
            match Select::new()
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact_opt()?
            {
                Some(i) => Msg::AfterPoll(AfterPoll::ALL[i]),
                None => Msg::Back,
            }
        }
        Screen::Jobs => {
            println!("{}\n", "Jobs".bold().magenta());
            let rows: Vec<String> = app.jobs().iter().map(format::job_row).collect();
            match Select::new()
                .with_prompt("Enter: download • Esc: back")
                .items(&rows)
                .default(0)
                .interact_opt()?
            {
                Some(i) => Msg::JobChosen(i),
                None => Msg::Back,
            }
        }
    };
    Ok(msg)
}

fn render_notices(app: &App) {
    if let Some(message) = app.message() {
        println!("{}\n", message.green().bold());
    }
    if let Some(error) = app.error() {
        println!("{}\n", format!("Error: {}", error).red().bold());
    }
}

fn render_outcome(outcome: &PollOutcome) {
    let summary = outcome.summary();
    match outcome {
        PollOutcome::Completed(item) => {
            println!("{}", summary.green().bold());
            let title = format::display_title(item.title.as_deref(), item.status);
            println!("{}\n", title);
        }
        PollOutcome::Failed(_) | PollOutcome::FetchFailed(_) => {
            println!("{}\n", summary.red().bold())
        }
        PollOutcome::Stopped => println!("{}\n", summary),
    }
}

fn clear_screen() {
    if stdout().is_terminal() {
        let _ = crossterm::execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0));
    }
}

/// Waits out the poll interval while ticking the spinner. `q`, `Esc` or
/// `Ctrl+C` end the wait early. Falls back to a plain sleep when stdin is
/// not a terminal.
#[derive(Default)]
pub struct KeyWaiter {
    spinner: Option<ProgressBar>,
}

impl KeyWaiter {
    pub fn with_spinner(spinner: ProgressBar) -> Self {
        Self {
            spinner: Some(spinner),
        }
    }

    fn tick(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.tick();
        }
    }
}

impl Waiter for KeyWaiter {
    fn wait(&mut self, interval: Duration) -> bool {
        let _raw = match RawMode::enable() {
            Some(raw) => raw,
            None => {
                std::thread::sleep(interval);
                return true;
            }
        };

        let Some(deadline) = Instant::now().checked_add(interval) else {
            std::thread::sleep(interval);
            return true;
        };
        loop {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            self.tick();
            let slice = (deadline - now).min(SPINNER_TICK);
            match event::poll(slice) {
                Ok(true) => {
                    if let Ok(Event::Key(key)) = event::read() {
                        if is_stop_key(&key) {
                            tracing::debug!("polling stopped by user");
                            return false;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "keyboard poll failed; sleeping instead");
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return true;
                }
            }
        }
    }
}

fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Raw mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> Option<Self> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        terminal::enable_raw_mode().ok().map(|_| RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
