use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tt_core::{Placed, PlacementError};
use types::{CourseId, Day, SlotKey};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct PlacementIn {
    pub course_id: CourseId,
    pub week: u32,
    pub day: Day,
    pub slot: String,
    #[serde(default)]
    pub copy: bool,
}

#[derive(Serialize, ToSchema)]
pub struct PlacementOut {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub course_ids: Vec<CourseId>,
    pub affected: Vec<String>,
}

impl PlacementOut {
    fn accepted(placed: Placed) -> Self {
        Self {
            ok: true,
            reason: None,
            course_ids: placed.course_ids,
            affected: placed.affected.iter().map(ToString::to_string).collect(),
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            course_ids: Vec::new(),
            affected: Vec::new(),
        }
    }
}

/// Conflicts become `ok = false` with the reason verbatim; caller bugs
/// (unknown course, invalid week) become HTTP errors.
fn reply(result: Result<Placed, PlacementError>) -> Result<Json<PlacementOut>, ApiError> {
    match result {
        Ok(placed) => Ok(Json(PlacementOut::accepted(placed))),
        Err(PlacementError::Conflict(conflict)) => {
            Ok(Json(PlacementOut::rejected(conflict.to_string())))
        }
        Err(e @ PlacementError::UnknownCourse(_)) => Err(ApiError::not_found(e.to_string())),
        Err(e @ PlacementError::Calendar(_)) => Err(ApiError::bad_request(e.to_string())),
    }
}

#[utoipa::path(
        post,
        path = "/v1/placements/check",
        request_body = PlacementIn,
        responses(
            (status = 200, description = "Whether the placement would be legal", body = PlacementOut),
            (status = 404, description = "Unknown course")
        )
    )]
pub async fn check(
    State(state): State<AppState>,
    Json(input): Json<PlacementIn>,
) -> Result<Json<PlacementOut>, ApiError> {
    let engine = state.engine.read();
    let verdict = engine.can_place(&input.course_id, input.week, input.day, &input.slot);
    match verdict {
        Ok(()) => Ok(Json(PlacementOut {
            ok: true,
            reason: None,
            course_ids: Vec::new(),
            affected: Vec::new(),
        })),
        Err(PlacementError::Conflict(conflict)) => {
            Ok(Json(PlacementOut::rejected(conflict.to_string())))
        }
        Err(e) => Err(ApiError::not_found(e.to_string())),
    }
}

#[utoipa::path(
        post,
        path = "/v1/placements",
        request_body = PlacementIn,
        responses(
            (status = 200, description = "Placement outcome", body = PlacementOut),
            (status = 400, description = "Invalid week number"),
            (status = 404, description = "Unknown course")
        )
    )]
pub async fn place(
    State(state): State<AppState>,
    Json(input): Json<PlacementIn>,
) -> Result<Json<PlacementOut>, ApiError> {
    let result = state.engine.write().place(
        &input.course_id,
        input.week,
        input.day,
        &input.slot,
        input.copy,
    );
    if result.is_ok() {
        state.engine.persist();
    }
    reply(result)
}

#[derive(Deserialize, ToSchema)]
pub struct UnassignIn {
    pub course_id: CourseId,
    /// Slot key string (`sem|week|group|DAY|slot`); omit to clear the
    /// course from every slot.
    #[serde(default)]
    pub slot_key: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UnassignOut {
    pub removed: Vec<String>,
}

#[utoipa::path(
        post,
        path = "/v1/placements/unassign",
        request_body = UnassignIn,
        responses(
            (status = 200, description = "Slots the course was removed from", body = UnassignOut),
            (status = 400, description = "Malformed slot key")
        )
    )]
pub async fn unassign(
    State(state): State<AppState>,
    Json(input): Json<UnassignIn>,
) -> Result<Json<UnassignOut>, ApiError> {
    let key = match &input.slot_key {
        Some(raw) => Some(
            raw.parse::<SlotKey>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        ),
        None => None,
    };
    let removed = state
        .engine
        .write()
        .unassign(&input.course_id, key.as_ref());
    if !removed.is_empty() {
        state.engine.persist();
    }
    Ok(Json(UnassignOut {
        removed: removed.iter().map(ToString::to_string).collect(),
    }))
}

#[derive(Deserialize, ToSchema)]
pub struct UnassignBatchIn {
    pub course_ids: Vec<CourseId>,
}

#[utoipa::path(
        post,
        path = "/v1/placements/unassign-batch",
        request_body = UnassignBatchIn,
        responses((status = 200, description = "Slots touched by the batch removal", body = UnassignOut))
    )]
pub async fn unassign_batch(
    State(state): State<AppState>,
    Json(input): Json<UnassignBatchIn>,
) -> Json<UnassignOut> {
    let removed = state.engine.write().unassign_many(&input.course_ids);
    if !removed.is_empty() {
        state.engine.persist();
    }
    Json(UnassignOut {
        removed: removed.iter().map(ToString::to_string).collect(),
    })
}
