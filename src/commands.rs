// One-shot subcommands. Each prints its result and returns; errors bubble
// up to `main`, which reports them and exits non-zero.

use crate::api::{self, PodcastApi};
use crate::app::validate_url;
use crate::credentials::CredentialStore;
use crate::format;
use crate::poller::{self, PollOutcome};
use crate::runtime::open_folder;
use crate::ui::{spinner, KeyWaiter};
use anyhow::{bail, Context, Result};
use dialoguer::Input;
use std::path::Path;
use std::time::Duration;

pub fn handle_auth<A>(api: &mut A, credentials: &CredentialStore, key: Option<&str>) -> Result<()>
where
    A: PodcastApi + ?Sized,
{
    let key = match key {
        Some(k) => k.to_string(),
        None => Input::new().with_prompt("API key").interact_text()?,
    };
    let saved = credentials.save(&key).context("Error setting API key")?;
    api.set_token(&saved);
    println!("API key saved to {}", credentials.path().display());
    Ok(())
}

pub fn handle_usage<A: PodcastApi + ?Sized>(api: &A) -> Result<()> {
    let usage = api.get_usage().context("error getting usage")?;
    println!("{}", format::format_usage(&usage));
    Ok(())
}

pub fn handle_jobs<A: PodcastApi + ?Sized>(api: &A) -> Result<()> {
    let mut jobs = api.list_jobs().context("error listing jobs")?;
    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }
    format::sort_newest_first(&mut jobs);
    for job in &jobs {
        println!("{}  {}", job.id, format::job_row(job));
    }
    Ok(())
}

pub fn handle_create<A: PodcastApi + ?Sized>(api: &A, url: &str) -> Result<()> {
    let url = validate_url(url).map_err(anyhow::Error::msg)?;
    api.create_jobs(&url).context("error creating job")?;
    println!("Job created successfully!");
    Ok(())
}

pub fn handle_download<A: PodcastApi + ?Sized>(api: &A, job_id: &str, dir: &Path) -> Result<()> {
    let progress = spinner("Downloading audio...");
    let result = api::download_job(api, job_id, dir);
    progress.finish_and_clear();
    let path = result.context("error downloading file")?;
    println!("Successfully downloaded audio to: {}", path.display());
    Ok(())
}

pub fn handle_open(dir: &Path) -> Result<()> {
    let dir = open_folder(dir).context("error opening downloads directory")?;
    println!("Opened {}", dir.display());
    Ok(())
}

/// Watch an item until it finishes. A failed conversion or a failed fetch
/// is reported as an error.
pub fn handle_poll<A: PodcastApi + ?Sized>(api: &A, item_id: &str, interval: Duration) -> Result<()> {
    let progress = spinner(&format!("Polling item {}...  (q: stop watching)", item_id));
    let mut waiter = KeyWaiter::with_spinner(progress.clone());
    let outcome = poller::poll_until_done(api, item_id, interval, &mut waiter, |state| {
        if let Some(status) = state.last_status() {
            progress.set_message(format!(
                "Polling item {}... Status: {}  (q: stop watching)",
                item_id, status
            ));
        }
    });
    progress.finish_and_clear();
    report_outcome(&outcome)
}

fn report_outcome(outcome: &PollOutcome) -> Result<()> {
    match outcome {
        PollOutcome::Completed(item) => {
            println!("{}", outcome.summary());
            if let Some(title) = item.title.as_deref() {
                println!("{}", title);
            }
            Ok(())
        }
        PollOutcome::Stopped => {
            println!("{}", outcome.summary());
            Ok(())
        }
        PollOutcome::Failed(_) | PollOutcome::FetchFailed(_) => bail!(outcome.summary()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPodcastApi;
    use crate::models::{Item, JobStatus};

    fn item(status: JobStatus) -> Item {
        Item {
            id: "item-1".into(),
            status,
            title: None,
            created: None,
        }
    }

    #[test]
    fn create_rejects_bad_url_before_calling_api() {
        let mut api = MockPodcastApi::new();
        api.expect_create_jobs().never();
        let err = handle_create(&api, "not a url").unwrap_err();
        assert!(err.to_string().contains("Not a valid"));
    }

    #[test]
    fn create_sends_url() {
        let mut api = MockPodcastApi::new();
        api.expect_create_jobs()
            .times(1)
            .returning(|url| {
                assert_eq!(url, "https://youtu.be/abc");
                Ok(())
            });
        handle_create(&api, " https://youtu.be/abc ").unwrap();
    }

    #[test]
    fn auth_stores_key_and_updates_client() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = CredentialStore::new(dir.path().join("api_key"));
        let mut api = MockPodcastApi::new();
        api.expect_set_token().times(1).return_const(());

        handle_auth(&mut api, &credentials, Some(" key-2 ")).unwrap();
        assert_eq!(credentials.load_stored().unwrap().as_deref(), Some("key-2"));
    }

    #[test]
    fn outcome_exit_status() {
        assert!(report_outcome(&PollOutcome::Completed(item(JobStatus::Success))).is_ok());
        assert!(report_outcome(&PollOutcome::Stopped).is_ok());
        assert!(report_outcome(&PollOutcome::Failed(item(JobStatus::Error))).is_err());
        let err = report_outcome(&PollOutcome::FetchFailed("boom".into())).unwrap_err();
        assert_eq!(err.to_string(), "Polling failed: boom");
    }
}
