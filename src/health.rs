use ::log::*;
use ::serde::{Deserialize, Serialize};

use crate::checker::PortChecker;
use crate::config::{Config, Target};

pub const ALL_HEALTHY_MESSAGE: &str = "All ports are listening and accessible";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub description: String,
    pub status: Status,

    #[serde(default, skip_serializing_if = "error_is_empty")]
    pub error: Option<String>,
}

fn error_is_empty(error: &Option<String>) -> bool {
    error.as_deref().map_or(true, str::is_empty)
}

impl CheckOutcome {
    pub fn healthy(target: &Target) -> CheckOutcome {
        CheckOutcome {
            name: target.name.clone(),
            host: target.host.clone(),
            port: target.port,
            description: target.description.clone(),
            status: Status::Healthy,
            error: None,
        }
    }

    pub fn unhealthy(target: &Target, error: String) -> CheckOutcome {
        CheckOutcome {
            status: Status::Unhealthy,
            error: Some(error).filter(|error| !error.is_empty()),
            ..CheckOutcome::healthy(target)
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == Status::Healthy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: Status,
    pub message: String,
    pub checks: ::std::vec::Vec<CheckOutcome>,
    pub timestamp: String,
    pub version: String,
}

impl HealthReport {
    /// Folds per-target outcomes into a report stamped with the current
    /// time. Outcome order is kept as given.
    pub fn from_outcomes(checks: ::std::vec::Vec<CheckOutcome>) -> HealthReport {
        let failed = checks
            .iter()
            .filter(|outcome| !outcome.is_healthy())
            .map(|outcome| {
                format!("{} ({}:{})", outcome.name, outcome.host, outcome.port)
            })
            .collect::<::std::vec::Vec<_>>();

        let (status, message) = if failed.is_empty() {
            (Status::Healthy, ALL_HEALTHY_MESSAGE.to_string())
        } else {
            (
                Status::Unhealthy,
                format!("Failed ports: [{}]", failed.join(", ")),
            )
        };

        HealthReport {
            status,
            message,
            checks,
            timestamp: ::chrono::Local::now()
                .to_rfc3339_opts(::chrono::SecondsFormat::Secs, true),
            version: crate::version::VERSION.to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == Status::Healthy
    }
}

async fn check_target(
    checker: &dyn PortChecker,
    target: &Target,
    default_timeout: ::std::time::Duration,
) -> CheckOutcome {
    let timeout = target.effective_timeout(default_timeout);

    match checker.check(&target.host, target.port, timeout).await {
        Ok(()) => {
            debug!("{} ({}) is reachable", target.name, target.address());
            CheckOutcome::healthy(target)
        }
        Err(err) => {
            warn!(
                "{} ({}) failed after {:?}: {:#}",
                target.name,
                target.address(),
                timeout,
                err
            );
            CheckOutcome::unhealthy(target, format!("{:#}", err))
        }
    }
}

/// Checks every target concurrently, so the report is ready once the
/// slowest single check finishes or times out.
pub async fn evaluate_with(
    checker: &dyn PortChecker,
    config: &Config,
) -> HealthReport {
    let outcomes = ::futures::future::join_all(
        config
            .checks
            .iter()
            .map(|target| check_target(checker, target, config.server.timeout)),
    )
    .await;

    HealthReport::from_outcomes(outcomes)
}

pub async fn evaluate(config: &Config) -> HealthReport {
    evaluate_with(&crate::checker::TcpChecker, config).await
}
