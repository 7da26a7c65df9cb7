use std::time::Duration;
use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

pub fn stack() -> ServiceBuilder<
    Stack<
        TimeoutLayer,
        Stack<
            CorsLayer,
            Stack<RequestBodyLimitLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>,
        >,
    >,
> {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let timeout = TimeoutLayer::new(Duration::from_secs(10));
    let limit = RequestBodyLimitLayer::new(1024 * 1024);

    // `CorsLayer` and `TimeoutLayer` synthesize responses via `ResBody::default()`
    // (preflight / timeout), so their inner service's body must implement `Default`.
    // `RequestBodyLimitLayer`'s `ResponseBody` does not, so the limit layer is applied
    // outside cors/timeout rather than innermost.
    ServiceBuilder::new()
        .layer(trace)
        .layer(limit)
        .layer(cors)
        .layer(timeout)
}
