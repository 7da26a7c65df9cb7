mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod catalog;
    pub mod config;
    pub mod conflicts;
    pub mod courses;
    pub mod health;
    pub mod placements;
    pub mod weeks;
}

use axum::{
    routing::{get, post, put},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::config::get_config,
            routes::config::put_config,
            routes::catalog::get_catalog,
            routes::catalog::put_catalog,
            routes::weeks::week,
            routes::courses::list,
            routes::courses::expand,
            routes::courses::update,
            routes::courses::delete,
            routes::courses::completeness,
            routes::placements::check,
            routes::placements::place,
            routes::placements::unassign,
            routes::placements::unassign_batch,
            routes::conflicts::conflicts,
        ),
        components(schemas(
            types::CourseInstance, types::CourseKind, types::Day, types::TokenList,
            types::ScheduleConfig, types::DateRange, types::SubjectInfo, types::SlotKey,
            types::CourseId, types::GroupId, types::SemesterId, types::SubjectCode,
            routes::weeks::WeekOut,
            routes::catalog::CatalogDto, routes::catalog::CatalogOut,
            routes::courses::ExpandIn, routes::courses::ExpandOut,
            routes::courses::CompletenessOut,
            routes::placements::PlacementIn, routes::placements::PlacementOut,
            routes::placements::UnassignIn, routes::placements::UnassignBatchIn,
            routes::placements::UnassignOut,
            routes::conflicts::ConflictsOut,
        )),
        tags(
            (name = "timetable", description = "Weekly timetable assignment API")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let app_state = state::AppState::init().await?;

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route(
            "/v1/config",
            get(routes::config::get_config).put(routes::config::put_config),
        )
        .route(
            "/v1/catalog",
            get(routes::catalog::get_catalog).put(routes::catalog::put_catalog),
        )
        .route("/v1/weeks/:n", get(routes::weeks::week))
        .route("/v1/courses", get(routes::courses::list))
        .route("/v1/courses/expand", post(routes::courses::expand))
        .route(
            "/v1/courses/completeness",
            get(routes::courses::completeness),
        )
        .route(
            "/v1/courses/:id",
            put(routes::courses::update).delete(routes::courses::delete),
        )
        .route("/v1/placements/check", post(routes::placements::check))
        .route("/v1/placements", post(routes::placements::place))
        .route(
            "/v1/placements/unassign",
            post(routes::placements::unassign),
        )
        .route(
            "/v1/placements/unassign-batch",
            post(routes::placements::unassign_batch),
        )
        .route("/v1/conflicts", get(routes::conflicts::conflicts))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(app_state);

    let port = std::env::var("TIMETABLE__SERVER__PORT").unwrap_or_else(|_| "8080".into());
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", port)
        .parse()
        .expect("invalid listen addr");
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
