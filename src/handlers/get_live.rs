use ::warp::Reply;

pub(crate) async fn handler()
    -> Result<::warp::reply::Response, ::std::convert::Infallible>
{
    Ok(::warp::reply::with_header(
        ::warp::reply::with_status("OK", ::warp::http::StatusCode::OK),
        "Content-Type",
        "text/plain",
    )
    .into_response())
}
