pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paddock Prediction Engine API",
        version = "1.0.0",
        description = "Settlement and competitive-ranking engine for race predictions"
    ),
    tags(
        (name = "Votes", description = "Pick-set submission"),
        (name = "Settlement", description = "Race settlement"),
        (name = "Races", description = "Race entry maintenance"),
        (name = "Contests", description = "Contest standings"),
        (name = "Rankings", description = "Leaderboards and rank lookup"),
        (name = "Scheduler", description = "Contest lifecycle, scheduler-only"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
