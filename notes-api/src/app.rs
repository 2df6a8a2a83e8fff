use aide::redoc::Redoc;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config;

use rand::Rng;
use serde_json::json;

use crate::{
    errors::{self, on_error, ErrorResponseDocs},
    notes::NoteService,
    openapi::{self, aide::axum::ApiRouter, OpenApi},
    state::AppState,
};

pub struct AppParams<Router>
where
    Router: FnOnce(AppState) -> ApiRouter,
{
    pub notes: NoteService,
    /// Frontend origin allowed to call the API.
    pub cors_origin: String,
    pub router: Router,
}

pub async fn create<R>(
    AppParams {
        notes,
        cors_origin,
        router,
    }: AppParams<R>,
) -> errors::Result<(Router, OpenApi)>
where
    R: FnOnce(AppState) -> ApiRouter,
{
    let mut api = OpenApi::default();

    let state = AppState { notes };

    let cors = cors_layer(&cors_origin)?;

    let docs_router = axum::Router::new()
        .route(
            "/__docs__",
            get(Redoc::new("/__docs__/spec.json")
                .with_title("Notes API")
                .axum_handler()),
        )
        .route("/__docs__/spec.json", get(serve_docs));

    let app = ApiRouter::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(docs_router)
        .merge(router(state))
        .finish_api_with(&mut api, |t| {
            t.title("Notes").default_response::<openapi::Json<ErrorResponseDocs>>()
        })
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(Extension(Arc::new(api.clone())))
                .layer(middleware::from_fn(on_error)),
        );

    Ok((app, api))
}

fn cors_layer(origin: &str) -> errors::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| errors::Error::Unexpected(format!("invalid CORS origin {origin:?}: {e}")))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]))
}

async fn version() -> impl IntoResponse {
    let config = config();
    Json(json!({
        "source" : config.source,
        "version": config.app_version.as_deref().unwrap_or(&config.version),
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat() -> impl IntoResponse {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..=10000);

    Json(json!({
        "status" : "ok",
        "random": random,
    }))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> Response {
    Json(api.as_ref()).into_response()
}
