// http entry point: Alertmanager webhook -> GitLab issues
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;

mod alertmanager;
mod handlers;
mod issues;

use crate::handlers::alert_handler;
use crate::issues::{
    description::DescriptionRenderer, issue_config::BridgeConfig, issue_error::ConfigError,
    issue_tracker::GitlabIssueTracker, reconciler::Reconciler,
};

/// Everything that can be wrong with the environment fails here, before binding.
fn bootstrap() -> Result<(BridgeConfig, Reconciler), ConfigError> {
    let config = BridgeConfig::from_env()?;
    log::info!("Loaded configuration: {:?}", config);

    let renderer = DescriptionRenderer::from_file(&config.template_path)?;
    let tracker = GitlabIssueTracker::from_config(&config)?;

    Ok((config, Reconciler::new(Arc::new(tracker), renderer)))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, reconciler) = bootstrap().map_err(|e| {
        log::error!("Startup failed: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    let reconciler = web::Data::new(reconciler);

    log::info!(
        "Forwarding alerts to project {} on {}, listening on 0.0.0.0:{}",
        config.project_id,
        config.gitlab_url,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(reconciler.clone())
            .configure(alert_handler::configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
