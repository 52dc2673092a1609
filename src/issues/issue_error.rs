use reqwest::StatusCode;
use serde_json::Error as JsonError;

/// Failures talking to the issue tracker.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("HTTP error ({0}): {1}")]
    Http(StatusCode, String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] JsonError),

    #[error("invalid tracker url: {0}")]
    Url(String),
}

/// Errors that fail a whole batch.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    #[error("issue lookup for fingerprint {fingerprint} failed: {source}")]
    Lookup {
        fingerprint: String,
        #[source]
        source: TrackerError,
    },

    #[error("issue creation for fingerprint {fingerprint} failed: {source}")]
    Create {
        fingerprint: String,
        #[source]
        source: TrackerError,
    },

    #[error("description render failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Startup errors. None of these are recoverable.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("cannot read description template {path}: {source}")]
    TemplateIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot compile description template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("cannot build tracker client: {0}")]
    Client(#[from] TrackerError),
}
