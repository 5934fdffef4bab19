// Command execution and the message loop that ties the model to the
// outside world. Everything runs on the calling thread: a command runs to
// completion (including the wait before a poll) before the next message is
// handled.

use crate::api::PodcastApi;
use crate::app::{App, Cmd, Msg};
use crate::credentials::CredentialStore;
use crate::poller::Waiter;
use anyhow::Result;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Executes commands against the API, the credential store and the local
/// filesystem.
pub struct Effects<'a, A: ?Sized, W: ?Sized> {
    pub api: &'a mut A,
    pub credentials: &'a CredentialStore,
    pub downloads_dir: &'a Path,
    pub waiter: &'a mut W,
}

impl<'a, A, W> Effects<'a, A, W>
where
    A: PodcastApi + ?Sized,
    W: Waiter + ?Sized,
{
    pub fn run(&mut self, cmd: Cmd) -> Option<Msg> {
        let msg = match cmd {
            Cmd::Quit => return None,
            Cmd::SaveApiKey(key) => Msg::ApiKeySaved(
                self.credentials
                    .save(&key)
                    .map(|saved| self.api.set_token(&saved))
                    .map_err(|e| format!("Error setting API key: {}", e)),
            ),
            Cmd::LoadUsage => Msg::UsageLoaded(
                self.api
                    .get_usage()
                    .map_err(|e| format!("Error getting usage: {}", e)),
            ),
            Cmd::LoadPodcasts => Msg::PodcastsLoaded(
                self.api
                    .list_podcasts()
                    .map_err(|e| format!("Error listing podcasts: {}", e)),
            ),
            Cmd::AddUrl { podcast_id, url } => Msg::UrlAdded(
                self.api
                    .add_url_to_podcast(&podcast_id, &url)
                    .map_err(|e| format!("Error adding URL to podcast: {}", e)),
            ),
            Cmd::CreateJob { url } => Msg::JobCreated(
                self.api
                    .create_jobs(&url)
                    .map_err(|e| format!("Error creating job: {}", e)),
            ),
            Cmd::PollItem { item_id, after } => {
                if !self.waiter.wait(after) {
                    return Some(Msg::PollStopped);
                }
                Msg::ItemPolled(self.api.poll_item(&item_id).map_err(|e| e.to_string()))
            }
            Cmd::LoadJobs => Msg::JobsLoaded(
                self.api
                    .list_jobs()
                    .map_err(|e| format!("Error listing jobs: {}", e)),
            ),
            Cmd::Download { job_id } => Msg::Downloaded(
                crate::api::download_job(&*self.api, &job_id, self.downloads_dir)
                    .map_err(|e| format!("Error downloading file: {}", e)),
            ),
            Cmd::OpenDownloads => Msg::DownloadsOpened(
                open_folder(self.downloads_dir)
                    .map_err(|e| format!("Error opening downloads directory: {}", e)),
            ),
        };
        Some(msg)
    }
}

/// Drive `app` until a `Quit` command. Queued messages are handled first;
/// `prompt` is asked for user input only when nothing is pending. `execute`
/// turns a command into its result message.
pub fn run_loop(
    app: &mut App,
    first: Msg,
    mut prompt: impl FnMut(&App) -> Result<Msg>,
    mut execute: impl FnMut(&App, Cmd) -> Option<Msg>,
) -> Result<()> {
    let mut queue = VecDeque::from([first]);
    loop {
        let msg = match queue.pop_front() {
            Some(msg) => msg,
            None => prompt(&*app)?,
        };
        match app.update(msg) {
            None => {}
            Some(Cmd::Quit) => return Ok(()),
            Some(cmd) => {
                tracing::debug!(?cmd, "executing");
                if let Some(next) = execute(&*app, cmd) {
                    queue.push_back(next);
                }
            }
        }
    }
}

/// Create the downloads folder if needed and open it in the platform file
/// browser.
pub fn open_folder(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let dir = dir.canonicalize()?;
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    std::process::Command::new(opener).arg(&dir).spawn()?;
    Ok(dir)
}
