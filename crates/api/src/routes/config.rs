use crate::state::AppState;
use axum::{extract::State, Json};
use types::ScheduleConfig;

#[utoipa::path(
        get,
        path = "/v1/config",
        responses((status = 200, description = "Current schedule configuration", body = ScheduleConfig))
    )]
pub async fn get_config(State(state): State<AppState>) -> Json<ScheduleConfig> {
    Json(state.engine.read().config.clone())
}

#[utoipa::path(
        put,
        path = "/v1/config",
        request_body = ScheduleConfig,
        responses((status = 200, description = "Updated configuration", body = ScheduleConfig))
    )]
pub async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<ScheduleConfig>,
) -> Json<ScheduleConfig> {
    {
        state.engine.write().config = config.clone();
    }
    state.engine.persist();
    Json(config)
}
