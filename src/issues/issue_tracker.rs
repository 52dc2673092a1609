// Issue tracker seam and the GitLab REST implementation
use super::issue_config::BridgeConfig;
use super::issue_error::TrackerError;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Open issues carrying `label`, in whatever order the tracker returns them.
    async fn find_open_issues(&self, label: &str) -> Result<Vec<TrackedIssue>, TrackerError>;

    async fn create_issue(&self, issue: &NewIssue) -> Result<TrackedIssue, TrackerError>;

    async fn add_note(&self, issue_iid: u64, body: &str) -> Result<(), TrackerError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackedIssue {
    pub iid: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
}

// GitLab takes labels as one comma separated string
#[derive(Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    description: &'a str,
    labels: String,
}

#[derive(Serialize)]
struct CreateNoteBody<'a> {
    body: &'a str,
}

#[derive(Clone)]
pub struct GitlabIssueTracker {
    client: reqwest::Client,
    base_url: Url,
    private_token: String,
    project_id: String,
}

impl GitlabIssueTracker {
    pub fn new(
        base_url: Url,
        private_token: String,
        project_id: String,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let client = reqwest::ClientBuilder::new().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            private_token,
            project_id,
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self, TrackerError> {
        Self::new(
            config.gitlab_url.clone(),
            config.api_token.clone(),
            config.project_id.clone(),
            config.request_timeout,
        )
    }

    /// `{base}/api/v4/projects/{project}/{tail...}`. The project id may be a
    /// `group/project` path, so it is encoded as a single segment.
    fn project_url(&self, tail: &[&str]) -> Result<Url, TrackerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TrackerError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v4", "projects"])
            .push(&self.project_id)
            .extend(tail);
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder) -> Result<String, TrackerError> {
        let resp = req
            .header(PRIVATE_TOKEN_HEADER, &self.private_token)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(TrackerError::Http(status, body))
        }
    }
}

#[async_trait]
impl IssueTracker for GitlabIssueTracker {
    async fn find_open_issues(&self, label: &str) -> Result<Vec<TrackedIssue>, TrackerError> {
        let url = self.project_url(&["issues"])?;
        let req = self
            .client
            .get(url)
            .query(&[("state", "opened"), ("labels", label)]);

        let body = self.send(req).await?;
        let issues: Vec<TrackedIssue> = serde_json::from_str(&body)?;
        Ok(issues)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<TrackedIssue, TrackerError> {
        let url = self.project_url(&["issues"])?;
        let payload = CreateIssueBody {
            title: &issue.title,
            description: &issue.description,
            labels: issue.labels.join(","),
        };

        let start = Instant::now();
        let body = self.send(self.client.post(url).json(&payload)).await?;
        log::debug!(
            "CreateIssue [{}] took: {:.4}s",
            self.project_id,
            start.elapsed().as_secs_f64()
        );

        Ok(serde_json::from_str(&body)?)
    }

    async fn add_note(&self, issue_iid: u64, body: &str) -> Result<(), TrackerError> {
        let iid = issue_iid.to_string();
        let url = self.project_url(&["issues", &iid, "notes"])?;

        let start = Instant::now();
        self.send(self.client.post(url).json(&CreateNoteBody { body }))
            .await?;
        log::debug!(
            "AddNote [{}#{}] took: {:.4}s",
            self.project_id,
            issue_iid,
            start.elapsed().as_secs_f64()
        );

        Ok(())
    }
}
