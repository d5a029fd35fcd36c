use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use shortlist_core::{Error, Recommendation};
use shortlist_engine::RetrievalEngine;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Deserialize)]
struct RecommendRequest {
    query: String,
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct RecommendationBody {
    assessment_name: String,
    assessment_url: String,
}

impl From<Recommendation> for RecommendationBody {
    fn from(rec: Recommendation) -> Self {
        Self {
            assessment_name: rec.name,
            assessment_url: rec.url,
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(engine: Arc<RetrievalEngine>, port: u16) -> std::io::Result<()> {
        info!("HTTP API listening on 0.0.0.0:{}", port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(engine.clone()))
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Registers the routes and the JSON body error handler. Expects
/// `web::Data<Arc<RetrievalEngine>>` to be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "detail": detail })),
        )
        .into()
    });

    cfg.app_data(json)
        .route("/health", web::get().to(health))
        .route("/recommend", web::post().to(recommend));
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok"
    })))
}

async fn recommend(
    engine: web::Data<Arc<RetrievalEngine>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let top_k = req.top_k.unwrap_or(engine.config().top_k);

    match engine.retrieve(&req.query, top_k).await {
        Ok(recs) => {
            let body: Vec<RecommendationBody> = recs.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(body))
        }
        Err(e @ Error::InvalidQuery(_)) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "detail": e.to_string()
        }))),
        Err(e) => {
            error!(error = %e, "recommend request failed");
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": e.to_string()
            })))
        }
    }
}
