use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use types::{CourseId, CourseInstance, GroupId, SemesterId};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct CoursesQuery {
    pub semester: String,
    #[serde(default)]
    pub group: Option<String>,
}

#[utoipa::path(
        get,
        path = "/v1/courses",
        params(CoursesQuery),
        responses((status = 200, description = "Course instances", body = [CourseInstance]))
    )]
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<CoursesQuery>,
) -> Json<Vec<CourseInstance>> {
    let engine = state.engine.read();
    let semester = SemesterId(q.semester);
    let courses = match q.group {
        Some(group) => engine
            .registry
            .courses_for_group(&GroupId(group), &semester)
            .into_iter()
            .cloned()
            .collect(),
        None => engine
            .registry
            .iter()
            .filter(|c| c.semester == semester)
            .cloned()
            .collect(),
    };
    Json(courses)
}

#[derive(Deserialize, ToSchema)]
pub struct ExpandIn {
    pub semester: String,
}

#[derive(Serialize, ToSchema)]
pub struct ExpandOut {
    pub added: usize,
}

#[utoipa::path(
        post,
        path = "/v1/courses/expand",
        request_body = ExpandIn,
        responses((status = 200, description = "Catalog expanded into the registry", body = ExpandOut))
    )]
pub async fn expand(
    State(state): State<AppState>,
    Json(input): Json<ExpandIn>,
) -> Json<ExpandOut> {
    let added = state
        .engine
        .write()
        .expand_catalog(&SemesterId(input.semester));
    if added > 0 {
        state.engine.persist();
    }
    Json(ExpandOut { added })
}

#[utoipa::path(
        put,
        path = "/v1/courses/{id}",
        params(("id" = String, Path, description = "Course instance id")),
        request_body = CourseInstance,
        responses(
            (status = 200, description = "Updated course", body = CourseInstance),
            (status = 404, description = "Unknown course")
        )
    )]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut course): Json<CourseInstance>,
) -> Result<Json<CourseInstance>, ApiError> {
    course.id = CourseId(id);
    let updated = {
        let mut engine = state.engine.write();
        engine
            .update_course(course.clone())
            .map_err(|e| ApiError::not_found(e.to_string()))?;
        // update re-derives sub_label, so answer with the stored row.
        engine.registry.get(&course.id).cloned().unwrap_or(course)
    };
    state.engine.persist();
    Ok(Json(updated))
}

#[utoipa::path(
        delete,
        path = "/v1/courses/{id}",
        params(("id" = String, Path, description = "Course instance id")),
        responses(
            (status = 200, description = "Deleted course", body = CourseInstance),
            (status = 404, description = "Unknown course")
        )
    )]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseInstance>, ApiError> {
    let removed = state.engine.write().delete_course(&CourseId(id.clone()));
    match removed {
        Some(course) => {
            state.engine.persist();
            Ok(Json(course))
        }
        None => Err(ApiError::not_found(format!("unknown course {id}"))),
    }
}

#[derive(Deserialize, IntoParams)]
pub struct CompletenessQuery {
    pub semester: String,
}

#[derive(Serialize, ToSchema)]
pub struct CompletenessOut {
    pub missing_teacher: Vec<String>,
    pub missing_room: Vec<String>,
}

#[utoipa::path(
        get,
        path = "/v1/courses/completeness",
        params(CompletenessQuery),
        responses((status = 200, description = "Subjects with unset teachers or rooms", body = CompletenessOut))
    )]
pub async fn completeness(
    State(state): State<AppState>,
    Query(q): Query<CompletenessQuery>,
) -> Json<CompletenessOut> {
    let engine = state.engine.read();
    let semester = SemesterId(q.semester);
    Json(CompletenessOut {
        missing_teacher: engine
            .registry
            .subjects_missing_teacher(&semester)
            .into_iter()
            .map(|s| s.0)
            .collect(),
        missing_room: engine
            .registry
            .subjects_missing_room(&semester)
            .into_iter()
            .map(|s| s.0)
            .collect(),
    })
}
