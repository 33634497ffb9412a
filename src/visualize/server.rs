use super::*;
use crate::Error;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Axes {
    x: Option<String>,
    y: Option<String>,
    /// Comma separated cluster ids.
    clusters: Option<String>,
}

impl Axes {
    fn clusters(&self) -> crate::Result<Vec<usize>> {
        self.clusters
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| Error::Validation(format!("{:?} is not a cluster id", s)))
            })
            .collect()
    }
}

pub struct DashboardServer;

impl DashboardServer {
    pub async fn run(dashboard: Dashboard, bind: &str, workers: usize) -> std::io::Result<()> {
        let dashboard = web::Data::new(dashboard);
        log::info!("{:<32}{:<32}", "starting dashboard server", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(dashboard.clone())
                .configure(board)
        })
        .workers(workers)
        .bind(bind)?
        .run()
        .await
    }
}

pub fn board(cfg: &mut web::ServiceConfig) {
    cfg.route("/columns", web::get().to(columns))
        .route("/points", web::get().to(points))
        .route("/summary", web::get().to(summary));
}

async fn columns(dashboard: web::Data<Dashboard>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "columns": dashboard.columns(),
        "clusters": dashboard.clusters(),
        "x": DEFAULT_X,
        "y": DEFAULT_Y,
    }))
}

async fn points(dashboard: web::Data<Dashboard>, query: web::Query<Axes>) -> impl Responder {
    let x = query.x.as_deref().unwrap_or(DEFAULT_X);
    let y = query.y.as_deref().unwrap_or(DEFAULT_Y);
    match query
        .clusters()
        .and_then(|clusters| dashboard.points(x, y, &clusters))
    {
        Ok(points) => HttpResponse::Ok().json(points),
        Err(e) => HttpResponse::BadRequest().json(json!({ "error": e.to_string() })),
    }
}

async fn summary(dashboard: web::Data<Dashboard>) -> impl Responder {
    HttpResponse::Ok().json(dashboard.report())
}
