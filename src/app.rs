use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/completions", get(handlers::get_completions))
        .route(
            "/api/habits/:id/completions/:date",
            put(handlers::set_completion).delete(handlers::delete_completion),
        )
        .route(
            "/api/habits/:id/completions/:date/toggle",
            post(handlers::toggle_completion),
        )
        .route("/api/habits/:id/stats", get(handlers::get_habit_stats))
        .route("/api/stats", get(handlers::get_overview))
        .route("/api/grid", get(handlers::get_grid))
        .route("/api/export", get(handlers::export_backup))
        .route("/api/import", post(handlers::import_backup))
        .route("/api/data", delete(handlers::clear_data))
        .route("/api/storage", get(handlers::storage_info))
        .with_state(state)
}
