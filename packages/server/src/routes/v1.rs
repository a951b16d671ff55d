use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/races", race_routes())
        .nest("/contests", contest_routes())
        .nest("/rankings", ranking_routes())
        .nest("/cron", cron_routes())
}

fn race_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::vote::submit_vote))
        .routes(routes!(handlers::race::settle_race))
        .routes(routes!(handlers::race::backfill_popularity))
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::contest::get_standing))
}

fn ranking_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::ranking::weekly_leaderboard))
        .routes(routes!(handlers::ranking::monthly_leaderboard))
        .routes(routes!(handlers::ranking::likes_leaderboard))
        .routes(routes!(handlers::ranking::get_user_rank))
}

fn cron_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::contest::cron_create_contest))
        .routes(routes!(handlers::contest::cron_monthly_reset))
}
