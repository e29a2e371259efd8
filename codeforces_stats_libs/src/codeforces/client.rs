use crate::codeforces::{model::*, query::*};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::{self, Duration};

type Result<T> = std::result::Result<T, CodeforcesError>;

#[derive(Debug, Error)]
pub enum CodeforcesError {
    #[error("failed to request to codeforces api")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid api url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("{0}")]
    ApiError(String),
    #[error("response of {0} carried no result")]
    EmptyResultError(String),
}

impl<T> CodeforcesResponse<T> {
    /// Turns a non-OK status into an error carrying the API's comment.
    pub fn into_result(self, method: &str) -> Result<T> {
        match self.status {
            ResponseStatus::Ok => self
                .result
                .ok_or_else(|| CodeforcesError::EmptyResultError(method.to_string())),
            _ => Err(CodeforcesError::ApiError(
                self.comment
                    .unwrap_or_else(|| String::from("API request failed")),
            )),
        }
    }
}

#[async_trait]
pub trait CodeforcesApi {
    async fn problems(&self) -> Result<ProblemSet>;
    async fn contests(&self, gym: bool) -> Result<Vec<Contest>>;
    async fn user_info(&self, handles: &[String]) -> Result<Vec<User>>;
    async fn user_status(&self, handle: &str, from: u32, count: u32) -> Result<Vec<Submission>>;
    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>>;
}

pub struct StandaloneCodeforcesClient {
    base_url: Url,
    credentials: Option<ApiCredentials>,
    client: Client,
}

impl StandaloneCodeforcesClient {
    pub fn new(api_url: &str, credentials: Option<ApiCredentials>) -> Result<Self> {
        let mut base_url = Url::parse(api_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(StandaloneCodeforcesClient {
            base_url,
            credentials,
            client,
        })
    }

    pub fn is_signed(&self) -> bool {
        self.credentials.is_some()
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        Ok(self.base_url.join(method)?)
    }

    async fn call<T: DeserializeOwned>(&self, query: MethodQueryBuilder) -> Result<T> {
        let method = query.method();
        let mut params = query.build();
        if let Some(credentials) = &self.credentials {
            let salt = nonce(&mut rand::thread_rng());
            credentials.sign(method, &mut params, Utc::now().timestamp(), &salt);
        }

        tracing::debug!("request {} with {} parameters", method, params.len());
        let res = self
            .client
            .get(self.method_url(method)?)
            .query(&params)
            .send()
            .await?;
        let status = res.status();
        let body = res.bytes().await?;

        decode_response(method, status, &body).map_err(|e| {
            tracing::error!("{} failed: {}", method, e);
            e
        })
    }
}

/// Failed calls come back as 4xx with a regular JSON envelope. Anything else
/// that is not JSON is reported with the HTTP status.
fn decode_response<T: DeserializeOwned>(
    method: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<T> {
    let response: CodeforcesResponse<T> = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => {
            return Err(CodeforcesError::ApiError(format!(
                "unexpected error [{}] from {}",
                status, method
            )));
        }
        Err(e) => return Err(e.into()),
    };

    response.into_result(method)
}

#[async_trait]
impl CodeforcesApi for StandaloneCodeforcesClient {
    async fn problems(&self) -> Result<ProblemSet> {
        self.call(MethodQueryBuilder::new("problemset.problems"))
            .await
    }

    async fn contests(&self, gym: bool) -> Result<Vec<Contest>> {
        self.call(MethodQueryBuilder::new("contest.list").gym(gym))
            .await
    }

    async fn user_info(&self, handles: &[String]) -> Result<Vec<User>> {
        self.call(MethodQueryBuilder::new("user.info").handles(handles))
            .await
    }

    async fn user_status(&self, handle: &str, from: u32, count: u32) -> Result<Vec<Submission>> {
        self.call(
            MethodQueryBuilder::new("user.status")
                .handle(handle)
                .from(from)
                .count(count),
        )
        .await
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>> {
        self.call(MethodQueryBuilder::new("user.rating").handle(handle))
            .await
    }
}

/// Reads a user's whole submission history page by page.
///
/// `from` is 1-based. Paging stops at the first page shorter than `page_size`,
/// and `interval` is slept between two pages.
pub async fn fetch_submissions<C>(
    api: &C,
    handle: &str,
    page_size: u32,
    interval: Duration,
) -> Result<Vec<Submission>>
where
    C: CodeforcesApi + Sync + ?Sized,
{
    let page_size = page_size.max(1);
    let mut submissions: Vec<Submission> = Vec::new();
    let mut from = 1;

    loop {
        let page = api.user_status(handle, from, page_size).await?;
        let fetched = page.len();
        tracing::info!(
            "{} submissions of {} fetched from {}",
            fetched,
            handle,
            from
        );
        submissions.extend(page);

        if (fetched as u32) < page_size {
            break;
        }
        from += page_size;
        time::sleep(interval).await;
    }

    Ok(submissions)
}
