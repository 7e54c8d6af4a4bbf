use ::log::*;
use ::warp::Reply;

pub(crate) mod get_health;
pub(crate) mod get_live;
pub(crate) mod get_root;

pub(crate) const NOT_FOUND_BODY: &str = "404 page not found";

pub(crate) fn not_found() -> ::warp::reply::Response {
    ::warp::reply::with_status(
        NOT_FOUND_BODY,
        ::warp::http::StatusCode::NOT_FOUND,
    )
    .into_response()
}

pub(crate) async fn handle_rejection(
    err: ::warp::Rejection,
) -> Result<::warp::reply::Response, ::std::convert::Infallible> {
    if err.find::<crate::auth::Unauthorized>().is_some() {
        return Ok(crate::auth::unauthorized_reply());
    }

    if err.is_not_found() {
        return Ok(not_found());
    }

    warn!("rejection {:?}", err);

    Ok(::warp::reply::with_status(
        "INTERNAL_SERVER_ERROR",
        ::warp::http::StatusCode::INTERNAL_SERVER_ERROR,
    )
    .into_response())
}
