use ::anyhow::{bail, Context};
use ::envconfig::Envconfig;
use ::log::*;
use ::serde::Deserialize;
use ::std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/portguard/config.yaml";
pub const DEFAULT_LISTEN_PORT: u16 = 8888;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub checks: ::std::vec::Vec<Target>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,

    pub host: ::std::net::IpAddr,

    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    pub auth: AuthSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            port: DEFAULT_LISTEN_PORT,
            host: ::std::net::IpAddr::from([0, 0, 0, 0]),
            timeout: DEFAULT_TIMEOUT,
            auth: AuthSettings::default(),
        }
    }
}

#[derive(Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

impl AuthSettings {
    /// Credentials are only enforced when enabled and both halves of the
    /// pair are configured.
    pub fn is_armed(&self) -> bool {
        self.enabled && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl ::std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub host: String,

    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: u16,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "deserialize_optional_duration")]
    pub timeout: Option<Duration>,
}

impl Target {
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => default,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(::envconfig::Envconfig, Debug, Default)]
pub struct EnvOverrides {
    #[envconfig(from = "PORTGUARD_LISTEN_PORT")]
    pub listen_port: Option<u16>,

    #[envconfig(from = "PORTGUARD_AUTH_USERNAME")]
    pub auth_username: Option<String>,

    #[envconfig(from = "PORTGUARD_AUTH_PASSWORD")]
    pub auth_password: Option<String>,
}

impl Config {
    pub fn from_yaml(data: &str) -> ::anyhow::Result<Config> {
        let mut config: Config = ::serde_yaml::from_str(data)
            .context("failed to parse config file")?;

        if config.server.port == 0 {
            config.server.port = DEFAULT_LISTEN_PORT;
        }

        if config.server.timeout.is_zero() {
            config.server.timeout = DEFAULT_TIMEOUT;
        }

        Ok(config)
    }

    pub fn load(path: &::std::path::Path) -> ::anyhow::Result<Config> {
        let data = ::std::fs::read_to_string(path).with_context(|| {
            format!("failed to read config file {}", path.display())
        })?;

        Config::from_yaml(&data)
    }

    pub fn apply_env(&mut self, overrides: EnvOverrides) {
        if let Some(port) = overrides.listen_port.filter(|port| *port != 0) {
            self.server.port = port;
        }

        if let Some(username) = overrides.auth_username {
            self.server.auth.username = username;
        }

        if let Some(password) = overrides.auth_password {
            self.server.auth.password = password;
        }
    }

    pub fn validate(&self) -> ::anyhow::Result<()> {
        if self.checks.is_empty() {
            bail!(
                "no port checks configured, please add checks to the \
                 configuration file"
            );
        }

        // Such targets stay configured and report unhealthy.
        for (index, target) in self.checks.iter().enumerate() {
            if target.host.trim().is_empty() {
                warn!("check #{} ({:?}) has no host", index + 1, target.name);
            }

            if target.port == 0 {
                warn!("check #{} ({:?}) has no port", index + 1, target.name);
            }
        }

        Ok(())
    }

    pub fn listen_address(&self) -> ::std::net::SocketAddr {
        ::std::net::SocketAddr::new(self.server.host, self.server.port)
    }
}

/// Reads the file, then layers `PORTGUARD_*` environment overrides on top.
pub fn load_with_env(path: &::std::path::Path) -> ::anyhow::Result<Config> {
    let mut config = Config::load(path)?;

    config.apply_env(
        EnvOverrides::init_from_env()
            .context("invalid PORTGUARD_* environment variable")?,
    );

    Ok(config)
}

/// Parses Go style durations such as `500ms`, `2s` or `1m30s`.
pub fn parse_duration(text: &str) -> ::anyhow::Result<Duration> {
    let text = text.trim();

    if text == "0" {
        return Ok(Duration::ZERO);
    }

    if text.is_empty() {
        bail!("empty duration");
    }

    let mut nanos = 0f64;
    let mut rest = text;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let value = number
            .parse::<f64>()
            .with_context(|| format!("invalid duration {:?}", text))?;

        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => bail!("missing unit in duration {:?}", text),
            other => bail!("unknown unit {:?} in duration {:?}", other, text),
        };

        nanos += value * scale;
        rest = tail;
    }

    Ok(Duration::from_nanos(nanos.round() as u64))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: ::serde::Deserializer<'de>,
{
    let raw = match PortValue::deserialize(deserializer)? {
        PortValue::Number(number) => number,
        PortValue::Text(text) if text.trim().is_empty() => 0,
        PortValue::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(<D::Error as ::serde::de::Error>::custom)?,
    };

    u16::try_from(raw).map_err(|_| {
        ::serde::de::Error::custom(format!("port {} out of range", raw))
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Seconds(u64),
    FractionalSeconds(f64),
    Text(String),
}

impl DurationValue {
    fn into_duration(self) -> ::anyhow::Result<Duration> {
        match self {
            DurationValue::Seconds(seconds) => Ok(Duration::from_secs(seconds)),
            DurationValue::FractionalSeconds(seconds) => {
                Duration::try_from_secs_f64(seconds)
                    .with_context(|| format!("invalid duration {}", seconds))
            }
            DurationValue::Text(text) => parse_duration(&text),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: ::serde::Deserializer<'de>,
{
    DurationValue::deserialize(deserializer)?
        .into_duration()
        .map_err(|err| ::serde::de::Error::custom(format!("{:#}", err)))
}

fn deserialize_optional_duration<'de, D>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error>
where
    D: ::serde::Deserializer<'de>,
{
    match Option::<DurationValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => {
            let duration = value.into_duration().map_err(|err| {
                <D::Error as ::serde::de::Error>::custom(format!("{:#}", err))
            })?;

            Ok(Some(duration).filter(|duration| !duration.is_zero()))
        }
    }
}
