#![allow(dead_code)]

use ::std::sync::{Arc, Mutex};

use portguard::server::{Routes, ServerStarter};
use portguard::Config;

pub fn make_config(yaml: &str) -> Arc<Config> {
    Arc::new(Config::from_yaml(yaml).expect("test config should parse"))
}

pub fn basic(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        ::base64::encode(format!("{}:{}", username, password))
    )
}

pub async fn open_listener() -> (::tokio::net::TcpListener, u16) {
    let listener = ::tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

pub async fn closed_port() -> u16 {
    let (listener, port) = open_listener().await;
    drop(listener);
    port
}

pub fn write_config(contents: &str) -> ::tempfile::NamedTempFile {
    use ::std::io::Write;

    let mut file = ::tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("failed to create temp config");
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Captures what `run` would have served instead of binding a socket.
#[derive(Default)]
pub struct RecordingStarter {
    pub started: Mutex<Option<(::std::net::SocketAddr, Routes)>>,
    pub fail_with: Option<String>,
}

impl RecordingStarter {
    pub fn failing(message: &str) -> RecordingStarter {
        RecordingStarter {
            fail_with: Some(message.to_string()),
            ..RecordingStarter::default()
        }
    }

    pub fn was_started(&self) -> bool {
        self.started.lock().unwrap().is_some()
    }

    pub fn address(&self) -> ::std::net::SocketAddr {
        self.started.lock().unwrap().as_ref().unwrap().0
    }

    pub fn routes(&self) -> Routes {
        self.started.lock().unwrap().as_ref().unwrap().1.clone()
    }
}

#[async_trait::async_trait]
impl ServerStarter for RecordingStarter {
    async fn start(
        &self,
        address: ::std::net::SocketAddr,
        routes: Routes,
    ) -> ::anyhow::Result<()> {
        *self.started.lock().unwrap() = Some((address, routes));

        match &self.fail_with {
            Some(message) => Err(::anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}
