use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/fragmentos/estudiantes", get(handlers::students_fragment))
        .route("/fragmentos/estadisticas", get(handlers::statistics_fragment))
        .route(
            "/api/estudiantes",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/api/estudiantes/:id",
            put(handlers::update_student).delete(handlers::delete_student),
        )
        .route("/api/estadisticas", get(handlers::get_statistics))
        .with_state(state)
}
