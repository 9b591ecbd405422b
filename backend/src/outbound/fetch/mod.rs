//! Reqwest-backed page and image fetcher.
//!
//! This adapter owns transport details only: the retry schedule, manual
//! redirect following, timeout and HTTP error mapping, and body decoding.
//! Redirects are followed by hand with a fresh retry budget per location, so
//! a flaky hop late in a chain does not burn attempts spent earlier.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, redirect};
use url::Url;

use crate::domain::ports::{FetchedBytes, FetchedPage, PageSource, PageSourceError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_USER_AGENT: &str = concat!("closet-backend/", env!("CARGO_PKG_VERSION"));

/// Retry schedule: a fixed number of attempts per location with linearly
/// growing pauses between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per location, the first included.
    pub max_attempts: u32,
    /// Backoff unit; the pause after attempt `n` is `n * backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }
}

/// Result of one request attempt against one location.
#[derive(Debug)]
enum Attempt<T> {
    /// Terminal success.
    Success(T),
    /// Follow this location with a fresh retry budget.
    Redirect(Url),
    /// Worth retrying: 5xx, transport failure, timeout.
    Retryable(String),
    /// Not worth retrying: 4xx, malformed redirect.
    Fatal(PageSourceError),
}

/// Drive attempts against a location chain until success, a fatal failure,
/// or an exhausted budget.
async fn fetch_following_redirects<T, F, Fut>(
    start: &Url,
    policy: RetryPolicy,
    max_redirects: usize,
    attempt: F,
) -> Result<T, PageSourceError>
where
    F: Fn(Url) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut current = start.clone();
    let mut hops = 0usize;
    loop {
        let mut last_failure = String::new();
        let mut next_location = None;
        for attempt_no in 1..=policy.max_attempts.max(1) {
            match attempt(current.clone()).await {
                Attempt::Success(value) => return Ok(value),
                Attempt::Fatal(err) => return Err(err),
                Attempt::Redirect(next) => {
                    next_location = Some(next);
                    break;
                }
                Attempt::Retryable(message) => {
                    tracing::debug!(url = %current, attempt = attempt_no, failure = %message, "fetch attempt failed");
                    last_failure = message;
                    if attempt_no < policy.max_attempts {
                        tokio::time::sleep(policy.delay_after(attempt_no)).await;
                    }
                }
            }
        }
        match next_location {
            Some(next) => {
                hops += 1;
                if hops > max_redirects {
                    return Err(PageSourceError::TooManyRedirects {
                        url: start.to_string(),
                    });
                }
                tracing::debug!(from = %current, to = %next, hop = hops, "following redirect");
                current = next;
            }
            None => {
                return Err(PageSourceError::RetriesExhausted {
                    url: current.to_string(),
                    message: last_failure,
                });
            }
        }
    }
}

/// Non-success classification of one response, before any body is read.
#[derive(Debug)]
enum Halt {
    /// Follow this location.
    Redirect(Url),
    /// Worth retrying.
    Retryable(String),
    /// Not worth retrying.
    Fatal(PageSourceError),
}

impl<T> From<Halt> for Attempt<T> {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Redirect(next) => Attempt::Redirect(next),
            Halt::Retryable(message) => Attempt::Retryable(message),
            Halt::Fatal(err) => Attempt::Fatal(err),
        }
    }
}

/// Classify one reqwest response, resolving any redirect target against the
/// requested location. `Ok(())` means a success status whose body should be
/// read.
fn classify_response(current: &Url, status: StatusCode, location: Option<&str>) -> Result<(), Halt> {
    if status.is_redirection() {
        let Some(raw) = location else {
            return Err(Halt::Fatal(PageSourceError::Status {
                url: current.to_string(),
                status: status.as_u16(),
            }));
        };
        return match current.join(raw) {
            Ok(next) => Err(Halt::Redirect(next)),
            Err(err) => Err(Halt::Fatal(PageSourceError::InvalidUrl {
                message: format!("redirect target {raw:?}: {err}"),
            })),
        };
    }
    if status.is_server_error() {
        return Err(Halt::Retryable(format!("status {}", status.as_u16())));
    }
    if !status.is_success() {
        return Err(Halt::Fatal(PageSourceError::Status {
            url: current.to_string(),
            status: status.as_u16(),
        }));
    }
    Ok(())
}

fn classify_transport_error(err: &reqwest::Error) -> Halt {
    if err.is_timeout() {
        Halt::Retryable("timed out".to_owned())
    } else {
        Halt::Retryable(format!("transport failure: {err}"))
    }
}

/// Page fetcher performing manual-redirect GET requests with retries.
pub struct HttpPageFetcher {
    client: Client,
    policy: RetryPolicy,
    max_redirects: usize,
}

impl HttpPageFetcher {
    /// Build a fetcher with the default timeout, retry schedule, and
    /// redirect budget.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_policy(DEFAULT_REQUEST_TIMEOUT, RetryPolicy::default())
    }

    /// Build a fetcher with explicit timeout and retry schedule.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_policy(timeout: Duration, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        // Redirects are followed manually so each location gets its own
        // retry budget.
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            policy,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, Halt> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| classify_transport_error(&err))?;
        Ok(response)
    }
}

/// Early-return a helper's `Halt` as an `Attempt<T>`.
macro_rules! try_attempt {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(halt) => return halt.into(),
        }
    };
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageSourceError> {
        fetch_following_redirects(url, self.policy, self.max_redirects, |current| async move {
            let response = try_attempt!(self.get(current.clone()).await);
            let status = response.status();
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            try_attempt!(classify_response(&current, status, location.as_deref()));
            match response.text().await {
                Ok(body) => Attempt::Success(FetchedPage {
                    final_url: current,
                    body,
                }),
                Err(err) => classify_transport_error(&err).into(),
            }
        })
        .await
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<FetchedBytes, PageSourceError> {
        fetch_following_redirects(url, self.policy, self.max_redirects, |current| async move {
            let response = try_attempt!(self.get(current.clone()).await);
            let status = response.status();
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            try_attempt!(classify_response(&current, status, location.as_deref()));
            match response.bytes().await {
                Ok(bytes) => Attempt::Success(FetchedBytes {
                    final_url: current,
                    bytes: bytes.to_vec(),
                    content_type,
                }),
                Err(err) => classify_transport_error(&err).into(),
            }
        })
        .await
    }
}
