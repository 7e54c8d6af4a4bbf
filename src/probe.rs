use ::anyhow::Context;
use ::envconfig::Envconfig;

#[derive(::envconfig::Envconfig, Debug)]
pub struct ProbeSettings {
    #[envconfig(from = "PORTGUARD_PROBE_HOST", default = "localhost")]
    pub host: String,

    #[envconfig(from = "PORTGUARD_PROBE_PORT", default = "8888")]
    pub port: u16,

    #[envconfig(from = "PORTGUARD_PROBE_PATH", default = "/live")]
    pub path: String,

    #[envconfig(from = "PORTGUARD_PROBE_USERNAME")]
    pub username: Option<String>,

    #[envconfig(from = "PORTGUARD_PROBE_PASSWORD")]
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl ProbeSettings {
    pub fn from_env() -> ::anyhow::Result<ProbeSettings> {
        ProbeSettings::init_from_env()
            .context("invalid PORTGUARD_PROBE_* environment variable")
    }

    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!(
            "http://{}{}",
            crate::checker::join_host_port(&self.host, self.port),
            path
        )
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Issues a single GET and returns the status code the server answered
/// with. Transport errors are returned as errors.
pub async fn probe(
    url: &str,
    credentials: Option<&Credentials>,
    timeout: ::std::time::Duration,
) -> ::anyhow::Result<::reqwest::StatusCode> {
    let client = ::reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build client")?;

    let mut request = client.get(url);

    if let Some(credentials) = credentials {
        request = request
            .basic_auth(&credentials.username, Some(&credentials.password));
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    Ok(response.status())
}
