use crate::errors::{AppError, STUDENT_NOT_FOUND};
use crate::models::{Student, StudentInput};
use crate::state::AppState;
use crate::stats::{aggregate, Statistics};
use crate::ui::{render_index, render_statistics, render_students_table};
use crate::view::{ViewQuery, ViewState};
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, AppError> {
    let view = ViewState::from(query);
    let students = state.store.list().await?;
    Ok(Html(render_index(&students, &aggregate(&students), &view)))
}

pub async fn students_fragment(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, AppError> {
    let view = ViewState::from(query);
    let students = state.store.list().await?;
    Ok(Html(render_students_table(&view.apply(&students), &view)))
}

pub async fn statistics_fragment(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let students = state.store.list().await?;
    Ok(Html(render_statistics(&aggregate(&students))))
}

pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(state.store.list().await?))
}

pub async fn get_statistics(State(state): State<AppState>) -> Result<Json<Statistics>, AppError> {
    let students = state.store.list().await?;
    Ok(Json(aggregate(&students)))
}

pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let Json(input) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let student = state.store.create(input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    let Path(id) = id.map_err(|_| AppError::not_found(STUDENT_NOT_FOUND))?;
    let Json(input) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    Ok(Json(state.store.update(id, input).await?))
}

pub async fn delete_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id.map_err(|_| AppError::not_found(STUDENT_NOT_FOUND))?;
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
