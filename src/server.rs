use ::anyhow::Context;
use ::clap::Parser;
use ::log::*;
use ::warp::Filter;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::handlers;
use crate::version::VERSION;

#[derive(Debug, ::clap::Parser)]
#[command(
    name = "portguard",
    about = "HTTP health check service reporting TCP port reachability",
    disable_version_flag = true
)]
pub struct Cli {
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: ::std::path::PathBuf,

    #[arg(long, help = "Print version and exit")]
    pub version: bool,
}

pub type Routes = ::warp::filters::BoxedFilter<(::warp::reply::Response,)>;

#[async_trait::async_trait]
pub trait ServerStarter: Send + Sync {
    async fn start(
        &self,
        address: ::std::net::SocketAddr,
        routes: Routes,
    ) -> ::anyhow::Result<()>;
}

/// Serves the routes until Ctrl-C or SIGTERM.
pub struct WarpStarter;

#[async_trait::async_trait]
impl ServerStarter for WarpStarter {
    async fn start(
        &self,
        address: ::std::net::SocketAddr,
        routes: Routes,
    ) -> ::anyhow::Result<()> {
        let (bound, server) = ::warp::serve(routes)
            .try_bind_with_graceful_shutdown(address, shutdown_signal())
            .with_context(|| format!("failed to bind {}", address))?;

        info!("HTTP server listening on {}", bound);

        server.await;

        info!("HTTP server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ::tokio::signal::ctrl_c().await {
            error!("unable to listen for ctrl-c: {}", err);
            ::std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match ::tokio::signal::unix::signal(
            ::tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("unable to listen for SIGTERM: {}", err);
                ::std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = ::std::future::pending::<()>();

    ::tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal, stopping");
}

fn into_response<R: ::warp::Reply>(reply: R) -> ::warp::reply::Response {
    reply.into_response()
}

/// Matches only when the whole request path equals `expected`, so
/// `/health/` and friends fall through to the catch-all.
fn exact_path(
    expected: &'static str,
) -> impl Filter<Extract = (), Error = ::warp::Rejection> + Clone {
    ::warp::path::full()
        .and_then(move |path: ::warp::path::FullPath| async move {
            if path.as_str() == expected {
                Ok(())
            } else {
                Err(::warp::reject::not_found())
            }
        })
        .untuple_one()
}

/// Every route, including the catch-all root, sits behind the auth gate.
pub fn routes(config: ::std::sync::Arc<Config>) -> Routes {
    let auth = crate::auth::with_auth(config.server.auth.clone());
    let config_filter = ::warp::any().map(move || config.clone());

    let health_route = exact_path("/health")
        .and(auth.clone())
        .and(config_filter.clone())
        .and_then(handlers::get_health::handler);

    let live_route = exact_path("/live")
        .and(auth.clone())
        .and_then(handlers::get_live::handler);

    let root_route = auth
        .and(::warp::path::full())
        .and(config_filter)
        .and_then(handlers::get_root::handler);

    health_route
        .or(live_route)
        .unify()
        .or(root_route)
        .unify()
        .recover(handlers::handle_rejection)
        .unify()
        .with(::warp::log("portguard::http"))
        .map(into_response)
        .boxed()
}

pub async fn serve(
    config: Config,
    config_path: &::std::path::Path,
    starter: &dyn ServerStarter,
) -> ::anyhow::Result<()> {
    let address = config.listen_address();

    info!("PortGuard v{} starting...", VERSION);
    info!("Configuration loaded from: {}", config_path.display());
    info!(
        "Monitoring {} ports with {:?} timeout",
        config.checks.len(),
        config.server.timeout
    );

    if config.server.auth.is_armed() {
        info!(
            "HTTP Basic Authentication: ENABLED (username: {})",
            config.server.auth.username
        );
    } else {
        info!("HTTP Basic Authentication: DISABLED");
    }

    info!("Endpoints:");
    info!("  - http://{}/health (detailed JSON status)", address);
    info!("  - http://{}/live (simple OK response)", address);

    let routes = routes(::std::sync::Arc::new(config));

    starter.start(address, routes).await.context("server error")
}

/// Parses arguments, loads configuration and hands the routes to
/// `starter`. Returns without starting anything for `--version`.
pub async fn run<I, T>(
    args: I,
    starter: &dyn ServerStarter,
) -> ::anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<::std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;

    if cli.version {
        println!("PortGuard version {}", VERSION);
        return Ok(());
    }

    let config = crate::config::load_with_env(&cli.config)
        .context("error loading configuration")?;

    config.validate()?;

    serve(config, &cli.config, starter).await
}
