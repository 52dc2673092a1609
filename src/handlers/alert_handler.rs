// Alertmanager webhook handler
use crate::alertmanager::payload::AlertBatch;
use crate::issues::reconciler::Reconciler;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/alert", web::post().to(handle_alert))
        .route("/healthz", web::get().to(healthz));
}

// malformed payloads get a bare 400, nothing is sent to the tracker
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        log::warn!("Rejected alert payload: {}", err);
        InternalError::from_response(err, HttpResponse::BadRequest().finish()).into()
    })
}

pub async fn handle_alert(
    payload: web::Json<AlertBatch>,
    reconciler: web::Data<Reconciler>,
) -> impl Responder {
    log::info!(
        "Received {} alert(s) from {} (group {})",
        payload.alerts.len(),
        payload.receiver,
        payload.group_key
    );

    match reconciler.reconcile(&payload).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({})),
        Err(e) => {
            // details stay in the log; the sender only sees the status
            log::error!("Alert batch from {} failed: {}", payload.receiver, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
