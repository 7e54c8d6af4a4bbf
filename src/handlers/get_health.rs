use ::warp::reply::Response;
use ::warp::{http::StatusCode, Reply};

/// Probes every configured target. Returns 200 if all of them accepted a
/// connection, otherwise 503.
pub(crate) async fn handler(
    config: ::std::sync::Arc<crate::config::Config>,
) -> Result<Response, ::std::convert::Infallible> {
    let report = crate::health::evaluate(&config).await;

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok(
        ::warp::reply::with_status(::warp::reply::json(&report), status)
            .into_response(),
    )
}
