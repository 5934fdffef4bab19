// API client module: a small blocking HTTP client for the conversion
// service. Every call is authenticated with the stored API key as a bearer
// token. The `PodcastApi` trait is what the rest of the crate talks to, so
// the state machine and poller can run against a mock.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{AddUrlRequest, ConvertRequest, Item, Job, JobList, JobStatus, Podcast, Usage};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Operations the service exposes to the client.
#[cfg_attr(test, mockall::automock)]
pub trait PodcastApi {
    /// Replace the API key used for subsequent calls.
    fn set_token(&mut self, token: &str);

    fn has_token(&self) -> bool;

    fn list_podcasts(&self) -> Result<Vec<Podcast>, ApiError>;

    /// Attach a video URL to a podcast feed. The returned item is what
    /// gets polled until the conversion finishes.
    fn add_url_to_podcast(&self, podcast_id: &str, url: &str) -> Result<Item, ApiError>;

    /// Queue a standalone conversion job for a URL.
    fn create_jobs(&self, url: &str) -> Result<(), ApiError>;

    fn get_job(&self, job_id: &str) -> Result<Job, ApiError>;

    fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;

    fn poll_item(&self, item_id: &str) -> Result<Item, ApiError>;

    /// Download the audio for a finished job into `dir`, returning the
    /// path written.
    fn download_file(&self, job_id: &str, dir: &Path) -> Result<PathBuf, ApiError>;

    fn get_usage(&self) -> Result<Usage, ApiError>;
}

/// Holds a reqwest blocking client, the base URL of the service and the
/// API key (if one has been configured).
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("ytrss-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone())
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authorization and content-type headers for every request. Fails
    /// before touching the network when no key is set.
    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingApiKey)?;
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ApiError::InvalidApiKey("contains characters not allowed in a header".into())
        })?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let res = req.headers(self.auth_headers()?).send()?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            tracing::warn!(%status, "request rejected");
            return Err(ApiError::Status { status, body });
        }
        Ok(res)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        let res = self.send(self.client.get(self.url(path)))?;
        decode(res)
    }
}

/// Decode a JSON body, reporting the path of the field that failed.
fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let body = res.text()?;
    let deserializer = &mut serde_json::Deserializer::from_str(&body);
    serde_path_to_error::deserialize(deserializer).map_err(|e| ApiError::Json {
        path: e.path().to_string(),
        source: e.into_inner(),
    })
}

impl PodcastApi for ApiClient {
    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn list_podcasts(&self) -> Result<Vec<Podcast>, ApiError> {
        self.get_json("/list-podcasts")
    }

    fn add_url_to_podcast(&self, podcast_id: &str, url: &str) -> Result<Item, ApiError> {
        tracing::debug!(podcast_id, url, "POST /podcasts/add-url");
        let body = AddUrlRequest { podcast_id, url };
        let res = self.send(self.client.post(self.url("/podcasts/add-url")).json(&body))?;
        let item: Item = decode(res)?;
        tracing::info!(item_id = %item.id, status = %item.status, "url added");
        Ok(item)
    }

    fn create_jobs(&self, url: &str) -> Result<(), ApiError> {
        tracing::debug!(url, "POST /convert");
        let body = ConvertRequest { urls: vec![url] };
        self.send(self.client.post(self.url("/convert")).json(&body))?;
        Ok(())
    }

    fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.get_json(&format!("/poll/jobs/{}", job_id))
    }

    fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let list: JobList = self.get_json("/poll/jobs")?;
        Ok(list.jobs)
    }

    fn poll_item(&self, item_id: &str) -> Result<Item, ApiError> {
        self.get_json(&format!("/poll/item/{}", item_id))
    }

    fn download_file(&self, job_id: &str, dir: &Path) -> Result<PathBuf, ApiError> {
        tracing::debug!(job_id, "POST /download");
        let mut res = self.send(self.client.post(self.url(&format!("/download/{}", job_id))))?;

        let disposition = res
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok());
        let filename = filename_from_disposition(disposition, job_id);

        fs::create_dir_all(dir).map_err(|source| ApiError::Io {
            operation: "Failed to create downloads directory",
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(filename);
        let mut out = File::create(&path).map_err(|source| ApiError::Io {
            operation: "Failed to create file",
            path: path.clone(),
            source,
        })?;
        let bytes = res.copy_to(&mut out)?;
        tracing::info!(job_id, bytes, path = %path.display(), "download complete");
        Ok(path)
    }

    fn get_usage(&self) -> Result<Usage, ApiError> {
        self.get_json("/get-usage")
    }
}

/// Check that a job finished successfully, then download it.
pub fn download_job<A>(api: &A, job_id: &str, dir: &Path) -> Result<PathBuf, ApiError>
where
    A: PodcastApi + ?Sized,
{
    let job = api.get_job(job_id)?;
    if job.status != JobStatus::Success {
        return Err(ApiError::NotReady(job.status.to_string()));
    }
    api.download_file(job_id, dir)
}

/// File name for a download. Uses the `filename` parameter of the
/// Content-Disposition header, stripped to its last path component, or
/// `<job_id>.mp3` when the header is missing or unusable.
pub fn filename_from_disposition(header: Option<&str>, job_id: &str) -> String {
    header
        .and_then(disposition_filename)
        .and_then(|name| {
            name.rsplit(|c| c == '/' || c == '\\')
                .next()
                .map(|last| last.trim().to_string())
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| format!("{}.mp3", job_id))
}

/// Value of the `filename` parameter. Quoted values may contain `;` and
/// backslash escapes.
fn disposition_filename(header: &str) -> Option<String> {
    let mut chars = header.chars().peekable();
    chars.by_ref().find(|&c| c == ';')?;
    while chars.peek().is_some() {
        let mut key = String::new();
        while let Some(c) = chars.next_if(|&c| c != '=' && c != ';') {
            key.push(c);
        }
        if chars.next() != Some('=') {
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '\\' => value.extend(chars.next()),
                    '"' => break,
                    _ => value.push(c),
                }
            }
            chars.by_ref().find(|&c| c == ';');
        } else {
            while let Some(c) = chars.next_if(|&c| c != ';') {
                value.push(c);
            }
            chars.next();
        }

        if key.trim().eq_ignore_ascii_case("filename") {
            return Some(value);
        }
    }
    None
}
