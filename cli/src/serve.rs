#![deny(missing_docs)]

//! # Serve Command
//!
//! Builds the model once and serves it read-only over HTTP.
//!
//! - `GET /sources`: registered source summaries and failures.
//! - `GET /model`: the full exported model.
//! - `GET /model/{key}`: one source, 404 when the key is not registered.

use crate::config::{SourceArgs, SourceConfig};
use crate::error::CliResult;
use crate::generate::build_registry;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use blockgen_core::export::ModelDocument;
use blockgen_core::{ModelAggregator, SourceFailure, SourceRegistry, SourceSummary};
use serde::Serialize;
use std::net::TcpListener;
use tracing::info;

/// Arguments for the serve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[clap(flatten)]
    pub sources: SourceArgs,

    /// Address to listen on.
    #[clap(long, env = "BLOCKGEN_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,
}

/// Immutable state shared by the handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ModelState {
    /// Registered sources.
    pub sources: Vec<SourceSummary>,
    /// Failed sources.
    pub failures: Vec<SourceFailure>,
    #[serde(skip)]
    document: ModelDocument,
}

impl ModelState {
    /// Captures a snapshot of `registry`.
    pub fn from_registry(registry: &SourceRegistry) -> Self {
        let snapshot = registry.snapshot();
        let sources = snapshot.entries.iter().map(|e| e.summary()).collect();
        let aggregator = ModelAggregator::from_snapshot(snapshot);
        Self {
            sources,
            failures: aggregator.failures().to_vec(),
            document: ModelDocument::from_aggregator(&aggregator),
        }
    }
}

/// Lists registered and failed sources.
#[get("/sources")]
pub async fn list_sources(state: web::Data<ModelState>) -> impl Responder {
    HttpResponse::Ok().json(state.get_ref())
}

/// Returns the full model.
#[get("/model")]
pub async fn full_model(state: web::Data<ModelState>) -> impl Responder {
    HttpResponse::Ok().json(&state.document)
}

/// Returns the model of one source.
#[get("/model/{key}")]
pub async fn source_model(state: web::Data<ModelState>, key: web::Path<String>) -> impl Responder {
    let key = key.into_inner();
    match state.document.sources.iter().find(|s| s.key == key) {
        Some(source) => HttpResponse::Ok().json(source),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Unknown source '{}'", key)
        })),
    }
}

/// Registers the model routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_sources)
        .service(full_model)
        .service(source_model);
}

fn build_server(
    listener: TcpListener,
    state: web::Data<ModelState>,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(
        HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
            .listen(listener)?
            .run(),
    )
}

/// Executes the serve command; blocks until the server stops.
pub fn execute(args: &ServeArgs) -> CliResult<()> {
    let config = SourceConfig::load(&args.sources)?;
    let state = web::Data::new(ModelState::from_registry(&build_registry(&config)));

    let listener = TcpListener::bind(&args.bind)?;
    info!(bind = %args.bind, sources = state.sources.len(), "Serving model");
    let server = build_server(listener, state)?;
    actix_rt::System::new().block_on(server)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use blockgen_core::{AppError, FetchedDocument};

    const ECHO: &str = r#"
openapi: 3.0.0
paths:
  /echo:
    post:
      requestBody:
        content:
          text/plain:
            schema: { type: string }
      responses:
        "200":
          content:
            text/plain:
              schema: { type: string }
"#;

    fn state() -> web::Data<ModelState> {
        let registry = SourceRegistry::new();
        registry.register("echo", Ok(FetchedDocument::new("echo.yaml", ECHO)));
        registry.register("gone", Err(AppError::Fetch("404 Not Found".into())));
        web::Data::new(ModelState::from_registry(&registry))
    }

    #[actix_web::test]
    async fn test_sources_endpoint() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/sources").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["sources"][0]["key"], "echo");
        assert_eq!(body["sources"][0]["actions"], 1);
        assert_eq!(body["failures"][0]["key"], "gone");
        assert_eq!(body["failures"][0]["kind"], "fetch");
    }

    #[actix_web::test]
    async fn test_model_endpoints() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/model").to_request();
        let model: ModelDocument = test::call_and_read_body_json(&app, req).await;
        assert_eq!(model.sources.len(), 1);
        assert_eq!(model.failures.len(), 1);

        let req = test::TestRequest::get().uri("/model/echo").to_request();
        let source: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(source["actions"][0]["return_type"], "string");
        assert_eq!(source["actions"][0]["params"][0]["name"], "string");
        assert_eq!(source["actions"][0]["params"][0]["binding"], "body");
    }

    #[actix_web::test]
    async fn test_unknown_key_is_not_found() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/model/gone").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_build_server_start_stop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server = build_server(listener, state()).unwrap();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        handle.stop(true).await;
    }
}
