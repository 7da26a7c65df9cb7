use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct WeekOut {
    pub week: u32,
    pub monday: NaiveDate,
    pub friday: NaiveDate,
}

#[utoipa::path(
        get,
        path = "/v1/weeks/{n}",
        params(("n" = u32, Path, description = "Teaching week number (1-based)")),
        responses(
            (status = 200, description = "Calendar range of the week, vacations skipped", body = WeekOut),
            (status = 400, description = "Invalid week number")
        )
    )]
pub async fn week(
    State(state): State<AppState>,
    Path(n): Path<u32>,
) -> Result<Json<WeekOut>, ApiError> {
    let engine = state.engine.read();
    let range = engine
        .week_range(n)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(WeekOut {
        week: n,
        monday: range.monday,
        friday: range.friday,
    }))
}
