use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::{SubjectCatalog, SubjectCode, SubjectInfo};
use utoipa::ToSchema;

/// Catalog keyed by subject code.
#[derive(Serialize, Deserialize, ToSchema)]
#[schema(value_type = Object)]
pub struct CatalogDto(pub BTreeMap<String, SubjectInfo>);

#[utoipa::path(
        get,
        path = "/v1/catalog",
        responses((status = 200, description = "Subject catalog", body = CatalogDto))
    )]
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogDto> {
    let engine = state.engine.read();
    Json(CatalogDto(
        engine
            .catalog
            .iter()
            .map(|(code, info)| (code.0.clone(), info.clone()))
            .collect(),
    ))
}

#[derive(Serialize, ToSchema)]
pub struct CatalogOut {
    pub subjects: usize,
}

#[utoipa::path(
        put,
        path = "/v1/catalog",
        request_body = CatalogDto,
        responses((status = 200, description = "Catalog replaced", body = CatalogOut))
    )]
pub async fn put_catalog(
    State(state): State<AppState>,
    Json(CatalogDto(entries)): Json<CatalogDto>,
) -> Json<CatalogOut> {
    let catalog: SubjectCatalog = entries
        .into_iter()
        .map(|(code, info)| (SubjectCode(code), info))
        .collect();
    let subjects = catalog.len();
    state.engine.write().catalog = catalog;
    state.engine.persist();
    Json(CatalogOut { subjects })
}
