mod common;
use common::make_config;

use portguard::probe::{probe, Credentials};
use portguard::server::routes;

async fn spawn_server(yaml: &str) -> ::std::net::SocketAddr {
    let (address, server) = ::warp::serve(routes(make_config(yaml)))
        .bind_ephemeral(([127, 0, 0, 1], 0));

    ::tokio::spawn(server);

    address
}

const TIMEOUT: ::std::time::Duration = ::std::time::Duration::from_secs(3);

#[tokio::test]
async fn probe_reads_liveness_status() {
    let address =
        spawn_server("checks:\n  - { name: a, host: 127.0.0.1, port: 1 }\n")
            .await;

    let live = probe(&format!("http://{}/live", address), None, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(live.as_u16(), 200);

    let health = probe(&format!("http://{}/health", address), None, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(health.as_u16(), 503);
}

#[tokio::test]
async fn probe_sends_basic_credentials() {
    let address = spawn_server(
        r#"
server:
  auth: { enabled: true, username: "admin", password: "secret" }
checks:
  - { name: a, host: 127.0.0.1, port: 1 }
"#,
    )
    .await;
    let url = format!("http://{}/live", address);

    let anonymous = probe(&url, None, TIMEOUT).await.unwrap();
    assert_eq!(anonymous.as_u16(), 401);

    let credentials = Credentials {
        username: "admin".to_string(),
        password: "secret".to_string(),
    };
    let authorized = probe(&url, Some(&credentials), TIMEOUT).await.unwrap();
    assert_eq!(authorized.as_u16(), 200);
}

#[tokio::test]
async fn probe_fails_when_nothing_listens() {
    let port = common::closed_port().await;

    let result =
        probe(&format!("http://127.0.0.1:{}/live", port), None, TIMEOUT).await;

    assert!(result.is_err());
}
