// Status polling for a submitted item. After a URL is accepted the client
// re-fetches the item's status on a fixed interval until it reaches
// `SUCCESS` or `ERROR`. A failed fetch also ends polling, with the error kept
// for display. There is no backoff; the only other way out is the user
// stopping.
//
// `PollState::advance` is the pure step used by the interactive app;
// `poll_until_done` drives the same step in a blocking loop.

use crate::api::PodcastApi;
use crate::models::{Item, JobStatus};
use std::time::Duration;

/// How polling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The item converted successfully.
    Completed(Item),
    /// The server gave up on the conversion.
    Failed(Item),
    /// Fetching the status failed; the conversion may still be running.
    FetchFailed(String),
    /// The user stopped watching.
    Stopped,
}

impl PollOutcome {
    pub fn summary(&self) -> String {
        match self {
            PollOutcome::Completed(item) | PollOutcome::Failed(item) => {
                format!("Polling finished with status: {}", item.status)
            }
            PollOutcome::FetchFailed(err) => format!("Polling failed: {}", err),
            PollOutcome::Stopped => "Polling stopped.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Still `CREATED` (or unrecognised); fetch again after the interval.
    Continue,
    Done(PollOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    item_id: String,
    last_status: Option<JobStatus>,
    attempts: u32,
}

impl PollState {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            last_status: None,
            attempts: 0,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn last_status(&self) -> Option<JobStatus> {
        self.last_status
    }

    /// Number of fetch results seen so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn advance(&mut self, fetched: Result<Item, String>) -> PollStep {
        self.attempts += 1;
        let item = match fetched {
            Ok(item) => item,
            Err(err) => {
                tracing::warn!(item_id = %self.item_id, attempt = self.attempts, error = %err, "poll failed");
                return PollStep::Done(PollOutcome::FetchFailed(err));
            }
        };

        self.last_status = Some(item.status);
        tracing::debug!(item_id = %self.item_id, attempt = self.attempts, status = %item.status, "polled");
        match item.status {
            JobStatus::Success => PollStep::Done(PollOutcome::Completed(item)),
            JobStatus::Error => PollStep::Done(PollOutcome::Failed(item)),
            JobStatus::Created | JobStatus::Unknown => PollStep::Continue,
        }
    }
}

/// Something that can pause between polls. Returns `false` when the user
/// asked to stop while waiting.
pub trait Waiter {
    fn wait(&mut self, interval: Duration) -> bool;
}

/// Plain sleep; never interrupted.
pub struct SleepWaiter;

impl Waiter for SleepWaiter {
    fn wait(&mut self, interval: Duration) -> bool {
        std::thread::sleep(interval);
        true
    }
}

/// Poll `item_id` every `interval` until it reaches a terminal state.
/// The first fetch happens one interval after the call. `on_update` sees
/// the state after every non-terminal fetch.
pub fn poll_until_done<A, W>(
    api: &A,
    item_id: &str,
    interval: Duration,
    waiter: &mut W,
    mut on_update: impl FnMut(&PollState),
) -> PollOutcome
where
    A: PodcastApi + ?Sized,
    W: Waiter + ?Sized,
{
    let mut state = PollState::new(item_id);
    loop {
        if !waiter.wait(interval) {
            return PollOutcome::Stopped;
        }
        let fetched = api.poll_item(item_id).map_err(|e| e.to_string());
        match state.advance(fetched) {
            PollStep::Continue => on_update(&state),
            PollStep::Done(outcome) => return outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPodcastApi;
    use crate::error::ApiError;
    use std::collections::VecDeque;

    fn item(status: JobStatus) -> Item {
        Item {
            id: "item-1".into(),
            status,
            title: None,
            created: None,
        }
    }

    /// Records requested waits instead of sleeping; stops after `limit`.
    struct RecordingWaiter {
        waits: Vec<Duration>,
        limit: usize,
    }

    impl RecordingWaiter {
        fn unlimited() -> Self {
            Self {
                waits: Vec::new(),
                limit: usize::MAX,
            }
        }
    }

    impl Waiter for RecordingWaiter {
        fn wait(&mut self, interval: Duration) -> bool {
            if self.waits.len() >= self.limit {
                return false;
            }
            self.waits.push(interval);
            true
        }
    }

    fn scripted(statuses: Vec<Result<JobStatus, &'static str>>) -> MockPodcastApi {
        let count = statuses.len();
        let mut script: VecDeque<_> = statuses.into();
        let mut api = MockPodcastApi::new();
        api.expect_poll_item()
            .times(count)
            .returning(move |_| match script.pop_front() {
                Some(Ok(status)) => Ok(item(status)),
                Some(Err(msg)) => Err(ApiError::InvalidApiKey(msg.into())),
                None => panic!("polled past the end of the script"),
            });
        api
    }

    #[test]
    fn created_continues_and_terminal_states_finish() {
        let mut state = PollState::new("item-1");
        assert_eq!(state.advance(Ok(item(JobStatus::Created))), PollStep::Continue);
        assert_eq!(state.last_status(), Some(JobStatus::Created));
        assert_eq!(state.advance(Ok(item(JobStatus::Unknown))), PollStep::Continue);

        assert_eq!(
            state.advance(Ok(item(JobStatus::Success))),
            PollStep::Done(PollOutcome::Completed(item(JobStatus::Success)))
        );
        assert_eq!(state.attempts(), 3);

        let mut state = PollState::new("item-1");
        assert_eq!(
            state.advance(Ok(item(JobStatus::Error))),
            PollStep::Done(PollOutcome::Failed(item(JobStatus::Error)))
        );
    }

    #[test]
    fn fetch_failure_is_terminal() {
        let mut state = PollState::new("item-1");
        state.advance(Ok(item(JobStatus::Created)));
        let step = state.advance(Err("connection refused".into()));
        assert_eq!(
            step,
            PollStep::Done(PollOutcome::FetchFailed("connection refused".into()))
        );
        // last known status survives a failed fetch
        assert_eq!(state.last_status(), Some(JobStatus::Created));
    }

    #[test]
    fn stops_polling_after_success() {
        let api = scripted(vec![
            Ok(JobStatus::Created),
            Ok(JobStatus::Created),
            Ok(JobStatus::Success),
        ]);
        let mut waiter = RecordingWaiter::unlimited();
        let mut seen = Vec::new();

        let outcome = poll_until_done(&api, "item-1", Duration::from_secs(2), &mut waiter, |s| {
            seen.push(s.attempts())
        });

        assert_eq!(outcome, PollOutcome::Completed(item(JobStatus::Success)));
        assert_eq!(waiter.waits, vec![Duration::from_secs(2); 3]);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn error_status_ends_polling() {
        let api = scripted(vec![Ok(JobStatus::Created), Ok(JobStatus::Error)]);
        let outcome = poll_until_done(
            &api,
            "item-1",
            Duration::from_secs(3),
            &mut RecordingWaiter::unlimited(),
            |_| {},
        );
        assert_eq!(outcome, PollOutcome::Failed(item(JobStatus::Error)));
    }

    #[test]
    fn fetch_error_surfaces_without_retry() {
        let api = scripted(vec![Ok(JobStatus::Created), Err("server down")]);
        let outcome = poll_until_done(
            &api,
            "item-1",
            Duration::from_secs(2),
            &mut RecordingWaiter::unlimited(),
            |_| {},
        );
        match outcome {
            PollOutcome::FetchFailed(msg) => assert!(msg.contains("server down")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn user_stop_ends_before_next_fetch() {
        let api = scripted(vec![Ok(JobStatus::Created)]);
        let mut waiter = RecordingWaiter {
            waits: Vec::new(),
            limit: 1,
        };
        let outcome = poll_until_done(&api, "item-1", Duration::from_secs(2), &mut waiter, |_| {});
        assert_eq!(outcome, PollOutcome::Stopped);
    }

    #[test]
    fn summaries() {
        assert_eq!(
            PollOutcome::Completed(item(JobStatus::Success)).summary(),
            "Polling finished with status: SUCCESS"
        );
        assert_eq!(
            PollOutcome::FetchFailed("timeout".into()).summary(),
            "Polling failed: timeout"
        );
    }
}
