use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use danmaku_core::config::ApiConfig;
use danmaku_core::models::{EpisodeId, MatchOutcome, MatchQuery, RawCommentEntry};

use crate::error::ApiError;
use crate::traits::{CommentService, MatchService};
use crate::types::{parse_comment_response, parse_match_response};

/// Fixed query for comment requests: merge related sources, convert to
/// simplified script.
const COMMENT_QUERY: &[(&str, &str)] = &[("withRelated", "true"), ("chConvert", "1")];

/// Client for the dandanplay match and comment endpoints.
#[derive(Clone)]
pub struct DandanClient {
    base_url: String,
    credentials: Option<(String, String)>,
    http: Client,
}

impl DandanClient {
    /// Build a client from the `[api]` config section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self {
            base_url: trim_base(config.base_url.clone()),
            credentials: config
                .credentials()
                .map(|(id, secret)| (id.to_string(), secret.to_string())),
            http,
        })
    }

    pub fn match_url(&self) -> String {
        format!("{}/api/v2/match", self.base_url)
    }

    pub fn comment_url(&self, episode_id: &EpisodeId) -> String {
        format!("{}/api/v2/comment/{episode_id}", self.base_url)
    }

    fn with_credentials(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((id, secret)) => req.header("X-AppId", id).header("X-AppSecret", secret),
            None => req,
        }
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(status, "dandanplay API error");
            Err(ApiError::Api {
                status,
                message: body,
            })
        }
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

impl MatchService for DandanClient {
    async fn match_file(&self, query: &MatchQuery) -> Result<MatchOutcome, ApiError> {
        debug!(
            file = %query.file_name,
            size = query.file_size,
            hash = %query.file_hash,
            "Sending match request"
        );
        let req = self.http.post(self.match_url()).json(query);
        let resp = self.with_credentials(req).send().await?;

        let resp = Self::check_response(resp).await?;
        let body = resp.text().await?;
        let outcome = parse_match_response(&body)?.into_outcome();

        debug!(
            error_code = outcome.error_code,
            is_matched = outcome.is_matched,
            candidates = outcome.matches.len(),
            "Match response"
        );
        Ok(outcome)
    }
}

impl CommentService for DandanClient {
    async fn fetch_raw(&self, episode_id: &EpisodeId) -> Result<Vec<RawCommentEntry>, ApiError> {
        debug!(episode_id = %episode_id, "Fetching comments");
        let req = self.http.get(self.comment_url(episode_id)).query(COMMENT_QUERY);
        let resp = self.with_credentials(req).send().await?;

        let resp = Self::check_response(resp).await?;
        let body = resp.text().await?;
        let entries = parse_comment_response(&body)?.into_entries();

        debug!(
            episode_id = %episode_id,
            count = entries.len(),
            "Comment response"
        );
        Ok(entries)
    }
}
