use ::anyhow::Context;
use ::std::time::Duration;

#[async_trait::async_trait]
pub trait PortChecker: Send + Sync {
    async fn check(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> ::anyhow::Result<()>;
}

/// Reachability probe that opens a plain TCP connection and closes it
/// without exchanging any data.
pub struct TcpChecker;

#[async_trait::async_trait]
impl PortChecker for TcpChecker {
    async fn check(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> ::anyhow::Result<()> {
        check_port(host, port, timeout).await
    }
}

pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Name resolution counts against `timeout` as well as the handshake.
pub async fn check_port(
    host: &str,
    port: u16,
    timeout: Duration,
) -> ::anyhow::Result<()> {
    let address = join_host_port(host, port);

    let stream = ::tokio::time::timeout(
        timeout,
        ::tokio::net::TcpStream::connect((host, port)),
    )
    .await
    .map_err(|_| ::anyhow::anyhow!("dial tcp {}: i/o timeout", address))?
    .with_context(|| format!("dial tcp {}", address))?;

    drop(stream);

    Ok(())
}
