use ::warp::Reply;

pub(crate) fn render_page(version: &str, target_count: usize) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>PortGuard - Health Check Service</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }}
        .container {{ background: white; padding: 30px; border-radius: 8px; }}
        .version {{ color: #666; font-size: 14px; }}
        code {{ background: #f0f0f0; padding: 2px 6px; border-radius: 3px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>PortGuard - Health Check Service</h1>
        <p class="version">Version: {version}</p>
        <p>Reports whether the configured TCP ports accept connections.</p>
        <h2>Endpoints</h2>
        <ul>
            <li><a href="/health"><code>/health</code></a> - status of every port check (JSON)</li>
            <li><a href="/live"><code>/live</code></a> - liveness probe (returns OK)</li>
        </ul>
        <h2>Configuration</h2>
        <p>Monitoring <strong>{target_count} ports</strong></p>
    </div>
</body>
</html>
"#,
        version = version,
        target_count = target_count,
    )
}

/// Mounted as the catch-all route, so anything but `/` is a 404.
pub(crate) async fn handler(
    path: ::warp::path::FullPath,
    config: ::std::sync::Arc<crate::config::Config>,
) -> Result<::warp::reply::Response, ::std::convert::Infallible> {
    if path.as_str() != "/" {
        return Ok(crate::handlers::not_found());
    }

    Ok(::warp::reply::html(render_page(
        crate::version::VERSION,
        config.checks.len(),
    ))
    .into_response())
}
