use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use types::{GroupId, SemesterId};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct ConflictsQuery {
    pub semester: String,
    pub week: u32,
    pub group: String,
}

#[derive(Serialize, ToSchema)]
pub struct ConflictsOut {
    /// Ids to render highlighted; advisory only, placement is never blocked
    /// by this endpoint.
    pub course_ids: Vec<String>,
}

#[utoipa::path(
        get,
        path = "/v1/conflicts",
        params(ConflictsQuery),
        responses((status = 200, description = "Course ids currently in conflict", body = ConflictsOut))
    )]
pub async fn conflicts(
    State(state): State<AppState>,
    Query(q): Query<ConflictsQuery>,
) -> Json<ConflictsOut> {
    let engine = state.engine.read();
    let mut ids: Vec<String> = engine
        .conflicts_for(&SemesterId(q.semester), q.week, &GroupId(q.group))
        .into_iter()
        .map(|id| id.0)
        .collect();
    ids.sort();
    Json(ConflictsOut { course_ids: ids })
}
