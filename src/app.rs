// Interactive application model. User input and command results arrive as
// `Msg` values; `App::update` applies one message and returns at most one
// `Cmd` for the runner. Polling is a command that waits out the interval and
// then fetches, so the next poll is only ever scheduled by the result of the
// previous one.

use crate::format;
use crate::models::{Item, Job, JobStatus, Podcast, Usage};
use crate::poller::{PollOutcome, PollState, PollStep};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SetApiKey,
    MainMenu,
    SelectPodcast,
    EnterUrl,
    EnterConvertUrl,
    Polling,
    PostPolling,
    Jobs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddUrl,
    ConvertUrl,
    ViewJobs,
    ViewUsage,
    OpenDownloads,
    SetApiKey,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 7] = [
        MenuAction::AddUrl,
        MenuAction::ConvertUrl,
        MenuAction::ViewJobs,
        MenuAction::ViewUsage,
        MenuAction::OpenDownloads,
        MenuAction::SetApiKey,
        MenuAction::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::AddUrl => "Add URL to Podcast",
            MenuAction::ConvertUrl => "Convert URL",
            MenuAction::ViewJobs => "View Jobs",
            MenuAction::ViewUsage => "View Usage",
            MenuAction::OpenDownloads => "Open Downloads Folder",
            MenuAction::SetApiKey => "Set API Key",
            MenuAction::Exit => "Exit",
        }
    }
}

/// Choices offered once polling has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterPoll {
    AddAnother,
    MainMenu,
    Exit,
}

impl AfterPoll {
    pub const ALL: [AfterPoll; 3] = [AfterPoll::AddAnother, AfterPoll::MainMenu, AfterPoll::Exit];

    pub fn label(self) -> &'static str {
        match self {
            AfterPoll::AddAnother => "Add another URL",
            AfterPoll::MainMenu => "Go to main menu",
            AfterPoll::Exit => "Exit",
        }
    }
}

/// Everything that can happen to the model. Failures arrive as the
/// user-facing error string.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    ApiKeyChecked(bool),
    ApiKeyEntered(String),
    ApiKeySaved(Result<(), String>),
    Menu(MenuAction),
    UsageLoaded(Result<Usage, String>),
    PodcastsLoaded(Result<Vec<Podcast>, String>),
    PodcastChosen(usize),
    UrlEntered(String),
    UrlAdded(Result<Item, String>),
    JobCreated(Result<(), String>),
    ItemPolled(Result<Item, String>),
    PollStopped,
    AfterPoll(AfterPoll),
    JobsLoaded(Result<Vec<Job>, String>),
    JobChosen(usize),
    Downloaded(Result<PathBuf, String>),
    DownloadsOpened(Result<PathBuf, String>),
    Back,
    Quit,
}

/// Work for the runner. Each command produces at most one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Quit,
    SaveApiKey(String),
    LoadUsage,
    LoadPodcasts,
    AddUrl { podcast_id: String, url: String },
    CreateJob { url: String },
    /// Wait `after`, then fetch the item's status.
    PollItem { item_id: String, after: Duration },
    LoadJobs,
    Download { job_id: String },
    OpenDownloads,
}

impl Cmd {
    /// Spinner text while the command runs.
    pub fn describe(&self) -> String {
        match self {
            Cmd::Quit => "Exiting...".into(),
            Cmd::SaveApiKey(_) => "Saving API key...".into(),
            Cmd::LoadUsage => "Retrieving usage...".into(),
            Cmd::LoadPodcasts => "Loading podcasts...".into(),
            Cmd::AddUrl { .. } => "Adding URL...".into(),
            Cmd::CreateJob { .. } => "Creating conversion job...".into(),
            Cmd::PollItem { item_id, .. } => format!("Polling item {}...", item_id),
            Cmd::LoadJobs => "Fetching jobs...".into(),
            Cmd::Download { .. } => "Downloading audio...".into(),
            Cmd::OpenDownloads => "Opening downloads folder...".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct App {
    screen: Screen,
    has_api_key: bool,
    poll_interval: Duration,
    podcasts: Vec<Podcast>,
    selected_podcast: Option<Podcast>,
    jobs: Vec<Job>,
    usage: Option<Usage>,
    announce_usage: bool,
    poll: Option<PollState>,
    outcome: Option<PollOutcome>,
    error: Option<String>,
    message: Option<String>,
}

impl App {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            screen: Screen::SetApiKey,
            has_api_key: false,
            poll_interval,
            podcasts: Vec::new(),
            selected_podcast: None,
            jobs: Vec::new(),
            usage: None,
            announce_usage: false,
            poll: None,
            outcome: None,
            error: None,
            message: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn podcasts(&self) -> &[Podcast] {
        &self.podcasts
    }

    pub fn selected_podcast(&self) -> Option<&Podcast> {
        self.selected_podcast.as_ref()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    pub fn poll_state(&self) -> Option<&PollState> {
        self.poll.as_ref()
    }

    pub fn outcome(&self) -> Option<&PollOutcome> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_polling(&self) -> bool {
        self.screen == Screen::Polling && self.poll.is_some()
    }

    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::Quit => {
                self.poll = None;
                Some(Cmd::Quit)
            }
            Msg::ApiKeyChecked(true) => {
                self.has_api_key = true;
                self.screen = Screen::MainMenu;
                Some(Cmd::LoadUsage)
            }
            Msg::ApiKeyChecked(false) => {
                self.has_api_key = false;
                self.screen = Screen::SetApiKey;
                self.message = Some("No API key found. Please enter one to continue.".into());
                None
            }
            Msg::ApiKeyEntered(key) => {
                let key = key.trim();
                if key.is_empty() {
                    self.error = Some("API key cannot be empty".into());
                    return None;
                }
                self.error = None;
                Some(Cmd::SaveApiKey(key.to_string()))
            }
            Msg::ApiKeySaved(Ok(())) => {
                self.has_api_key = true;
                self.error = None;
                self.message = Some("API key saved successfully!".into());
                self.screen = Screen::MainMenu;
                Some(Cmd::LoadUsage)
            }
            Msg::ApiKeySaved(Err(e)) => {
                self.error = Some(e);
                None
            }
            Msg::Menu(action) => self.on_menu(action),
            Msg::UsageLoaded(result) => {
                let announce = std::mem::take(&mut self.announce_usage);
                match result {
                    Ok(usage) => {
                        if announce {
                            self.message = Some(format::format_usage(&usage));
                        }
                        self.usage = Some(usage);
                    }
                    Err(e) if announce => self.error = Some(e),
                    Err(e) => tracing::warn!(error = %e, "usage refresh failed"),
                }
                None
            }
            Msg::PodcastsLoaded(Err(e)) => {
                self.error = Some(e);
                self.screen = Screen::MainMenu;
                None
            }
            Msg::PodcastsLoaded(Ok(podcasts)) => {
                self.podcasts = podcasts;
                if self.podcasts.is_empty() {
                    self.message =
                        Some("No podcasts found. Please create a podcast on the website first.".into());
                    self.screen = Screen::MainMenu;
                } else {
                    self.error = None;
                    self.screen = Screen::SelectPodcast;
                }
                None
            }
            Msg::PodcastChosen(index) => {
                if self.screen != Screen::SelectPodcast {
                    return None;
                }
                if let Some(podcast) = self.podcasts.get(index) {
                    self.selected_podcast = Some(podcast.clone());
                    self.error = None;
                    self.screen = Screen::EnterUrl;
                }
                None
            }
            Msg::UrlEntered(raw) => self.on_url(&raw),
            Msg::UrlAdded(Ok(item)) => {
                self.error = None;
                self.outcome = None;
                self.screen = Screen::Polling;
                let cmd = Cmd::PollItem {
                    item_id: item.id.clone(),
                    after: self.poll_interval,
                };
                self.poll = Some(PollState::new(item.id));
                Some(cmd)
            }
            Msg::UrlAdded(Err(e)) => {
                self.error = Some(e);
                None
            }
            Msg::JobCreated(Ok(())) => {
                self.error = None;
                self.message = Some("Conversion job created. Check View Jobs for progress.".into());
                self.screen = Screen::MainMenu;
                None
            }
            Msg::JobCreated(Err(e)) => {
                self.error = Some(e);
                None
            }
            Msg::ItemPolled(fetched) => self.on_poll_result(fetched),
            Msg::PollStopped => self.stop_polling(),
            Msg::AfterPoll(choice) => self.on_after_poll(choice),
            Msg::JobsLoaded(Err(e)) => {
                self.error = Some(e);
                self.screen = Screen::MainMenu;
                None
            }
            Msg::JobsLoaded(Ok(mut jobs)) => {
                if jobs.is_empty() {
                    self.jobs.clear();
                    self.message = Some("No jobs found.".into());
                    self.screen = Screen::MainMenu;
                } else {
                    format::sort_newest_first(&mut jobs);
                    self.jobs = jobs;
                    self.screen = Screen::Jobs;
                }
                None
            }
            Msg::JobChosen(index) => {
                if self.screen != Screen::Jobs {
                    return None;
                }
                let job = self.jobs.get(index)?;
                self.message = None;
                if job.status == JobStatus::Success {
                    self.error = None;
                    Some(Cmd::Download {
                        job_id: job.id.clone(),
                    })
                } else {
                    self.error = Some(format!(
                        "Job is not ready for download. status: {}",
                        job.status
                    ));
                    None
                }
            }
            Msg::Downloaded(Ok(path)) => {
                self.error = None;
                self.message = Some(format!(
                    "Successfully downloaded audio to: {}",
                    path.display()
                ));
                None
            }
            Msg::Downloaded(Err(e)) | Msg::DownloadsOpened(Err(e)) => {
                self.error = Some(e);
                None
            }
            Msg::DownloadsOpened(Ok(path)) => {
                self.error = None;
                self.message = Some(format!("Opened {}", path.display()));
                None
            }
            Msg::Back => self.back(),
        }
    }

    fn on_menu(&mut self, action: MenuAction) -> Option<Cmd> {
        self.error = None;
        self.message = None;
        match action {
            MenuAction::AddUrl => Some(Cmd::LoadPodcasts),
            MenuAction::ConvertUrl => {
                self.screen = Screen::EnterConvertUrl;
                None
            }
            MenuAction::ViewJobs => Some(Cmd::LoadJobs),
            MenuAction::ViewUsage => {
                self.announce_usage = true;
                Some(Cmd::LoadUsage)
            }
            MenuAction::OpenDownloads => Some(Cmd::OpenDownloads),
            MenuAction::SetApiKey => {
                self.screen = Screen::SetApiKey;
                None
            }
            MenuAction::Exit => Some(Cmd::Quit),
        }
    }

    fn on_url(&mut self, raw: &str) -> Option<Cmd> {
        let url = match validate_url(raw) {
            Ok(url) => url,
            Err(e) => {
                self.error = Some(e);
                return None;
            }
        };
        match self.screen {
            Screen::EnterUrl => {
                let podcast = self.selected_podcast.as_ref()?;
                self.error = None;
                Some(Cmd::AddUrl {
                    podcast_id: podcast.id.clone(),
                    url,
                })
            }
            Screen::EnterConvertUrl => {
                self.error = None;
                Some(Cmd::CreateJob { url })
            }
            _ => None,
        }
    }

    fn on_poll_result(&mut self, fetched: Result<Item, String>) -> Option<Cmd> {
        if self.screen != Screen::Polling {
            tracing::debug!("dropping poll result outside polling");
            return None;
        }
        let poll = self.poll.as_mut()?;
        match poll.advance(fetched) {
            PollStep::Continue => Some(Cmd::PollItem {
                item_id: poll.item_id().to_string(),
                after: self.poll_interval,
            }),
            PollStep::Done(outcome) => {
                let reload_usage = matches!(outcome, PollOutcome::Completed(_));
                self.poll = None;
                self.outcome = Some(outcome);
                self.screen = Screen::PostPolling;
                reload_usage.then_some(Cmd::LoadUsage)
            }
        }
    }

    fn stop_polling(&mut self) -> Option<Cmd> {
        if self.screen != Screen::Polling {
            return None;
        }
        if let Some(poll) = self.poll.take() {
            self.message = Some(format!(
                "Stopped watching item {}. The conversion continues on the server.",
                poll.item_id()
            ));
        }
        self.screen = Screen::MainMenu;
        None
    }

    fn on_after_poll(&mut self, choice: AfterPoll) -> Option<Cmd> {
        self.outcome = None;
        self.error = None;
        self.message = None;
        match choice {
            AfterPoll::AddAnother if self.selected_podcast.is_some() => {
                self.screen = Screen::EnterUrl;
                None
            }
            AfterPoll::AddAnother => Some(Cmd::LoadPodcasts),
            AfterPoll::MainMenu => {
                self.selected_podcast = None;
                self.screen = Screen::MainMenu;
                Some(Cmd::LoadUsage)
            }
            AfterPoll::Exit => Some(Cmd::Quit),
        }
    }

    fn back(&mut self) -> Option<Cmd> {
        match self.screen {
            Screen::SetApiKey if !self.has_api_key => Some(Cmd::Quit),
            Screen::MainMenu => Some(Cmd::Quit),
            Screen::Polling => self.stop_polling(),
            Screen::PostPolling => self.on_after_poll(AfterPoll::MainMenu),
            Screen::EnterUrl => {
                self.error = None;
                self.screen = Screen::SelectPodcast;
                None
            }
            Screen::SetApiKey | Screen::SelectPodcast | Screen::EnterConvertUrl | Screen::Jobs => {
                self.error = None;
                self.screen = Screen::MainMenu;
                None
            }
        }
    }
}

/// Accept only absolute http(s) URLs with a host.
pub fn validate_url(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("URL cannot be empty".into());
    }
    match reqwest::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            Ok(raw.to_string())
        }
        _ => Err(format!("Not a valid http(s) URL: {}", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_secs(2);

    fn podcast(id: &str) -> Podcast {
        Podcast {
            id: id.into(),
            name: format!("Podcast {}", id),
        }
    }

    fn item(status: JobStatus) -> Item {
        Item {
            id: "item-1".into(),
            status,
            title: None,
            created: None,
        }
    }

    fn job(id: &str, status: JobStatus, created: &str) -> Job {
        Job {
            id: id.into(),
            url: format!("https://youtu.be/{}", id),
            status,
            title: None,
            created: Some(created.into()),
        }
    }

    /// App on the URL prompt for podcast `p1`.
    fn at_url_prompt() -> App {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(true));
        assert_eq!(app.update(Msg::Menu(MenuAction::AddUrl)), Some(Cmd::LoadPodcasts));
        app.update(Msg::PodcastsLoaded(Ok(vec![podcast("p1"), podcast("p2")])));
        app.update(Msg::PodcastChosen(0));
        assert_eq!(app.screen(), Screen::EnterUrl);
        app
    }

    fn polling() -> App {
        let mut app = at_url_prompt();
        app.update(Msg::UrlEntered("https://youtu.be/abc".into()));
        app.update(Msg::UrlAdded(Ok(item(JobStatus::Created))));
        app
    }

    #[test]
    fn startup_depends_on_api_key() {
        let mut app = App::new(TICK);
        assert_eq!(app.update(Msg::ApiKeyChecked(true)), Some(Cmd::LoadUsage));
        assert_eq!(app.screen(), Screen::MainMenu);

        let mut app = App::new(TICK);
        assert_eq!(app.update(Msg::ApiKeyChecked(false)), None);
        assert_eq!(app.screen(), Screen::SetApiKey);
        assert!(app.message().is_some());
        // esc without a key quits
        assert_eq!(app.update(Msg::Back), Some(Cmd::Quit));
    }

    #[test]
    fn api_key_entry() {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(false));

        assert_eq!(app.update(Msg::ApiKeyEntered("  ".into())), None);
        assert_eq!(app.error(), Some("API key cannot be empty"));

        assert_eq!(
            app.update(Msg::ApiKeyEntered(" key-1 ".into())),
            Some(Cmd::SaveApiKey("key-1".into()))
        );
        assert_eq!(app.update(Msg::ApiKeySaved(Ok(()))), Some(Cmd::LoadUsage));
        assert_eq!(app.screen(), Screen::MainMenu);
        assert_eq!(app.message(), Some("API key saved successfully!"));

        // with a key stored, backing out of the key screen returns to the menu
        app.update(Msg::Menu(MenuAction::SetApiKey));
        assert_eq!(app.screen(), Screen::SetApiKey);
        assert_eq!(app.update(Msg::Back), None);
        assert_eq!(app.screen(), Screen::MainMenu);
    }

    #[test]
    fn podcast_loading_outcomes() {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(true));

        app.update(Msg::PodcastsLoaded(Err("Error listing podcasts: 500".into())));
        assert_eq!(app.screen(), Screen::MainMenu);
        assert_eq!(app.error(), Some("Error listing podcasts: 500"));

        app.update(Msg::PodcastsLoaded(Ok(vec![])));
        assert_eq!(app.screen(), Screen::MainMenu);
        assert!(app.message().unwrap().contains("No podcasts found"));

        app.update(Msg::PodcastsLoaded(Ok(vec![podcast("p1")])));
        assert_eq!(app.screen(), Screen::SelectPodcast);
        // out of range selection is ignored
        app.update(Msg::PodcastChosen(5));
        assert_eq!(app.screen(), Screen::SelectPodcast);
    }

    #[test]
    fn url_submission_validates_then_adds() {
        let mut app = at_url_prompt();

        assert_eq!(app.update(Msg::UrlEntered("not a url".into())), None);
        assert!(app.error().is_some());
        assert_eq!(app.update(Msg::UrlEntered("ftp://example.com/a".into())), None);

        assert_eq!(
            app.update(Msg::UrlEntered(" https://youtu.be/abc ".into())),
            Some(Cmd::AddUrl {
                podcast_id: "p1".into(),
                url: "https://youtu.be/abc".into(),
            })
        );
        assert_eq!(app.error(), None);

        app.update(Msg::UrlAdded(Err("API request failed: 402".into())));
        assert_eq!(app.screen(), Screen::EnterUrl);
        assert_eq!(app.error(), Some("API request failed: 402"));
    }

    #[test]
    fn added_url_starts_polling_after_one_interval() {
        let mut app = at_url_prompt();
        let cmd = app.update(Msg::UrlAdded(Ok(item(JobStatus::Created))));
        assert_eq!(
            cmd,
            Some(Cmd::PollItem {
                item_id: "item-1".into(),
                after: TICK
            })
        );
        assert!(app.is_polling());
        assert_eq!(app.poll_state().unwrap().item_id(), "item-1");
    }

    #[test]
    fn created_created_success_stops_polling() {
        let mut app = polling();
        let next = Some(Cmd::PollItem {
            item_id: "item-1".into(),
            after: TICK,
        });

        assert_eq!(app.update(Msg::ItemPolled(Ok(item(JobStatus::Created)))), next);
        assert_eq!(app.update(Msg::ItemPolled(Ok(item(JobStatus::Created)))), next);
        assert_eq!(
            app.update(Msg::ItemPolled(Ok(item(JobStatus::Success)))),
            Some(Cmd::LoadUsage)
        );

        assert_eq!(app.screen(), Screen::PostPolling);
        assert!(!app.is_polling());
        assert_eq!(
            app.outcome(),
            Some(&PollOutcome::Completed(item(JobStatus::Success)))
        );

        // a late tick after the terminal state schedules nothing
        assert_eq!(app.update(Msg::ItemPolled(Ok(item(JobStatus::Created)))), None);
        assert_eq!(app.screen(), Screen::PostPolling);
    }

    #[test]
    fn job_error_and_fetch_failure_are_terminal() {
        let mut app = polling();
        assert_eq!(app.update(Msg::ItemPolled(Ok(item(JobStatus::Error)))), None);
        assert_eq!(app.screen(), Screen::PostPolling);
        assert_eq!(app.outcome(), Some(&PollOutcome::Failed(item(JobStatus::Error))));

        let mut app = polling();
        assert_eq!(app.update(Msg::ItemPolled(Err("timed out".into()))), None);
        assert_eq!(app.screen(), Screen::PostPolling);
        assert_eq!(
            app.outcome(),
            Some(&PollOutcome::FetchFailed("timed out".into()))
        );
    }

    #[test]
    fn user_can_stop_polling() {
        let mut app = polling();
        assert_eq!(app.update(Msg::PollStopped), None);
        assert_eq!(app.screen(), Screen::MainMenu);
        assert!(app.message().unwrap().contains("item-1"));
        assert_eq!(app.update(Msg::ItemPolled(Ok(item(JobStatus::Created)))), None);

        let mut app = polling();
        assert_eq!(app.update(Msg::Quit), Some(Cmd::Quit));
        assert!(!app.is_polling());
    }

    #[test]
    fn after_poll_choices() {
        let mut app = polling();
        app.update(Msg::ItemPolled(Ok(item(JobStatus::Success))));
        assert_eq!(app.update(Msg::AfterPoll(AfterPoll::AddAnother)), None);
        assert_eq!(app.screen(), Screen::EnterUrl);
        assert_eq!(app.selected_podcast().unwrap().id, "p1");

        let mut app = polling();
        app.update(Msg::ItemPolled(Ok(item(JobStatus::Success))));
        assert_eq!(
            app.update(Msg::AfterPoll(AfterPoll::MainMenu)),
            Some(Cmd::LoadUsage)
        );
        assert_eq!(app.screen(), Screen::MainMenu);
        assert!(app.selected_podcast().is_none());
        assert!(app.outcome().is_none());

        let mut app = polling();
        app.update(Msg::ItemPolled(Ok(item(JobStatus::Error))));
        assert_eq!(app.update(Msg::AfterPoll(AfterPoll::Exit)), Some(Cmd::Quit));
    }

    #[test]
    fn convert_flow() {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(true));
        app.update(Msg::Menu(MenuAction::ConvertUrl));
        assert_eq!(app.screen(), Screen::EnterConvertUrl);
        assert_eq!(
            app.update(Msg::UrlEntered("https://youtu.be/x".into())),
            Some(Cmd::CreateJob {
                url: "https://youtu.be/x".into()
            })
        );
        app.update(Msg::JobCreated(Ok(())));
        assert_eq!(app.screen(), Screen::MainMenu);
        assert!(app.message().unwrap().contains("Conversion job created"));
    }

    #[test]
    fn jobs_are_sorted_and_only_finished_ones_download() {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(true));
        assert_eq!(app.update(Msg::Menu(MenuAction::ViewJobs)), Some(Cmd::LoadJobs));
        app.update(Msg::JobsLoaded(Ok(vec![
            job("old", JobStatus::Success, "2024-01-01T00:00:00Z"),
            job("new", JobStatus::Created, "2024-05-01T00:00:00Z"),
        ])));
        assert_eq!(app.screen(), Screen::Jobs);
        assert_eq!(app.jobs()[0].id, "new");

        assert_eq!(app.update(Msg::JobChosen(0)), None);
        assert_eq!(
            app.error(),
            Some("Job is not ready for download. status: CREATED")
        );

        assert_eq!(
            app.update(Msg::JobChosen(1)),
            Some(Cmd::Download {
                job_id: "old".into()
            })
        );
        app.update(Msg::Downloaded(Ok(PathBuf::from("downloads/old.mp3"))));
        assert_eq!(
            app.message(),
            Some("Successfully downloaded audio to: downloads/old.mp3")
        );

        app.update(Msg::Back);
        assert_eq!(app.screen(), Screen::MainMenu);
    }

    #[test]
    fn empty_job_list_stays_on_menu() {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(true));
        app.update(Msg::JobsLoaded(Ok(vec![])));
        assert_eq!(app.screen(), Screen::MainMenu);
        assert_eq!(app.message(), Some("No jobs found."));
    }

    #[test]
    fn usage_refresh_is_silent_unless_requested() {
        let mut app = App::new(TICK);
        app.update(Msg::ApiKeyChecked(true));
        app.update(Msg::UsageLoaded(Err("offline".into())));
        assert_eq!(app.error(), None);

        app.update(Msg::Menu(MenuAction::ViewUsage));
        app.update(Msg::UsageLoaded(Ok(Usage {
            used: 1024,
            limit: 2048,
        })));
        assert_eq!(app.message(), Some("Usage: 1.00 KB / 2.00 KB (50%)"));
        assert_eq!(app.usage().unwrap().used, 1024);

        app.update(Msg::Menu(MenuAction::ViewUsage));
        app.update(Msg::UsageLoaded(Err("offline".into())));
        assert_eq!(app.error(), Some("offline"));
    }

    #[test]
    fn back_navigation() {
        let mut app = at_url_prompt();
        app.update(Msg::Back);
        assert_eq!(app.screen(), Screen::SelectPodcast);
        app.update(Msg::Back);
        assert_eq!(app.screen(), Screen::MainMenu);
        assert_eq!(app.update(Msg::Back), Some(Cmd::Quit));
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_url("http://youtu.be/abc").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("youtube.com/watch").is_err());
        assert!(validate_url("mailto:a@b.c").is_err());
    }
}
