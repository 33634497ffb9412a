use super::*;
use crate::Error;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use serde_json::json;

/// Body of every 500. Internal detail stays in the logs.
pub const INTERNAL_ERROR: &str = "an error occurred during prediction";

pub struct Server;

impl Server {
    pub async fn run(service: Service, bind: &str, workers: usize) -> Result<(), std::io::Error> {
        let service = web::Data::new(service);
        log::info!("{:<32}{:<32}", "starting inference server", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(service.clone())
                .configure(routes)
        })
        .workers(workers)
        .bind(bind)?
        .run()
        .await
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/predict", web::post().to(predict))
        .route("/health", web::get().to(health))
        .route("/refresh", web::post().to(refresh));
}

fn failure(e: &Error) -> HttpResponse {
    if e.is_client() {
        log::warn!("rejected request: {}", e);
        HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))
    } else {
        log::error!("prediction failed: {}", e);
        HttpResponse::InternalServerError().json(json!({ "error": INTERNAL_ERROR }))
    }
}

async fn predict(service: web::Data<Service>, body: web::Bytes) -> impl Responder {
    guarded(|| Service::records(&body).and_then(|batch| service.predict(&batch)))
}

/// Maps a prediction outcome to a response. A panic becomes a generic 500
/// and the worker keeps serving.
fn guarded<F>(work: F) -> HttpResponse
where
    F: FnOnce() -> crate::Result<Vec<usize>>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(work)) {
        Ok(Ok(clusters)) => HttpResponse::Ok().json(clusters),
        Ok(Err(e)) => failure(&e),
        Err(_) => {
            log::error!("prediction panicked");
            HttpResponse::InternalServerError().json(json!({ "error": INTERNAL_ERROR }))
        }
    }
}

async fn health(service: web::Data<Service>) -> impl Responder {
    let model = service.model();
    HttpResponse::Ok().json(json!({
        "k": model.k(),
        "columns": model.columns(),
        "trained": model.trained(),
    }))
}

async fn refresh(service: web::Data<Service>) -> impl Responder {
    match service.refresh() {
        Ok(model) => HttpResponse::Ok().json(json!({ "k": model.k(), "trained": model.trained() })),
        Err(e) => {
            log::error!("refresh failed, keeping current model: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": INTERNAL_ERROR }))
        }
    }
}
