// Issue description rendering
use super::issue_error::ConfigError;
use crate::alertmanager::payload::{Alert, AlertBatch};
use chrono::{DateTime, Utc};
use handlebars::{Handlebars, RenderError};
use serde::Serialize;
use std::collections::BTreeMap;

const TEMPLATE_NAME: &str = "description";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Serialize)]
struct DescriptionData<'a> {
    fingerprint: &'a str,
    status: String,
    annotations: &'a BTreeMap<String, String>,
    starts_at: String,
    ends_at: String,
    generator_url: &'a str,
    alertmanager_url: &'a str,
    receiver: &'a str,
    group_key: &'a str,
}

/// Compiled once at startup. Rendering never touches the filesystem.
pub struct DescriptionRenderer {
    handlebars: Handlebars<'static>,
}

impl DescriptionRenderer {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::TemplateIo {
            path: path.to_string(),
            source,
        })?;
        Self::from_template(&source)
    }

    pub fn from_template(source: &str) -> Result<Self, ConfigError> {
        let mut handlebars = Handlebars::new();
        // output is markdown for the tracker, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(TEMPLATE_NAME, source)?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, batch: &AlertBatch, alert: &Alert) -> Result<String, RenderError> {
        let data = DescriptionData {
            fingerprint: &alert.fingerprint,
            status: alert.status.to_string(),
            annotations: &alert.annotations,
            starts_at: format_timestamp(&alert.starts_at),
            ends_at: format_timestamp(&alert.ends_at),
            generator_url: &alert.generator_url,
            alertmanager_url: &batch.external_url,
            receiver: &batch.receiver,
            group_key: &batch.group_key,
        };
        self.handlebars.render(TEMPLATE_NAME, &data)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
