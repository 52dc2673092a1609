// In-memory IssueTracker used by the reconciler and handler tests
use super::issue_error::TrackerError;
use super::issue_tracker::{IssueTracker, NewIssue, TrackedIssue};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MemoryIssue {
    pub iid: u64,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub open: bool,
    pub notes: Vec<String>,
}

#[derive(Default)]
struct State {
    issues: Vec<MemoryIssue>,
    next_iid: u64,
    lookups: Vec<String>,
    fail_lookups: bool,
    fail_create_labels: HashSet<String>,
    fail_note_iids: HashSet<u64>,
}

/// Behaves like GitLab for the three calls the bridge makes, including the
/// `/close` quick action in note bodies.
#[derive(Default)]
pub struct MemoryTracker {
    state: Mutex<State>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_issue(&self, labels: &[&str]) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_iid += 1;
        let iid = state.next_iid;
        state.issues.push(MemoryIssue {
            iid,
            title: format!("issue {}", iid),
            description: String::new(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            open: true,
            notes: Vec::new(),
        });
        iid
    }

    pub fn fail_lookups(&self) {
        self.state.lock().unwrap().fail_lookups = true;
    }

    /// Creation fails for any issue carrying `label`.
    pub fn fail_create_with_label(&self, label: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_create_labels
            .insert(label.to_string());
    }

    pub fn fail_notes_on(&self, iid: u64) {
        self.state.lock().unwrap().fail_note_iids.insert(iid);
    }

    pub fn issues(&self) -> Vec<MemoryIssue> {
        self.state.lock().unwrap().issues.clone()
    }

    pub fn issue(&self, iid: u64) -> MemoryIssue {
        self.issues()
            .into_iter()
            .find(|i| i.iid == iid)
            .expect("no such issue")
    }

    /// Labels searched for, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.state.lock().unwrap().lookups.clone()
    }
}

#[async_trait]
impl IssueTracker for MemoryTracker {
    async fn find_open_issues(&self, label: &str) -> Result<Vec<TrackedIssue>, TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.lookups.push(label.to_string());
        if state.fail_lookups {
            return Err(TrackerError::Http(
                StatusCode::BAD_GATEWAY,
                "lookup unavailable".into(),
            ));
        }

        Ok(state
            .issues
            .iter()
            .filter(|i| i.open && i.labels.iter().any(|l| l == label))
            .map(|i| TrackedIssue {
                iid: i.iid,
                title: i.title.clone(),
                labels: i.labels.clone(),
            })
            .collect())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<TrackedIssue, TrackerError> {
        let mut state = self.state.lock().unwrap();
        if issue
            .labels
            .iter()
            .any(|l| state.fail_create_labels.contains(l))
        {
            return Err(TrackerError::Http(
                StatusCode::INTERNAL_SERVER_ERROR,
                "create failed".into(),
            ));
        }

        state.next_iid += 1;
        let iid = state.next_iid;
        state.issues.push(MemoryIssue {
            iid,
            title: issue.title.clone(),
            description: issue.description.clone(),
            labels: issue.labels.clone(),
            open: true,
            notes: Vec::new(),
        });

        Ok(TrackedIssue {
            iid,
            title: issue.title.clone(),
            labels: issue.labels.clone(),
        })
    }

    async fn add_note(&self, issue_iid: u64, body: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_note_iids.contains(&issue_iid) {
            return Err(TrackerError::Http(
                StatusCode::SERVICE_UNAVAILABLE,
                "note failed".into(),
            ));
        }

        let issue = state
            .issues
            .iter_mut()
            .find(|i| i.iid == issue_iid)
            .ok_or_else(|| TrackerError::Http(StatusCode::NOT_FOUND, "404 Not found".into()))?;

        issue.notes.push(body.to_string());
        if body.lines().any(|l| l.trim() == "/close") {
            issue.open = false;
        }
        Ok(())
    }
}
