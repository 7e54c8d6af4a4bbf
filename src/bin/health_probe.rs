//! Lightweight health-probe binary for container health checks.
//!
//! Behaviour:
//!   • Performs a single HTTP GET request against a running portguard.
//!   • Prints the HTTP status code or any error to stdout/stderr.
//!   • Exits with code 0 if the status is 200, otherwise exits 1.
//!
//! Environment variables (optional):
//!   PORTGUARD_PROBE_HOST       Hostname (default: localhost)
//!   PORTGUARD_PROBE_PORT       Port to query (default: 8888)
//!   PORTGUARD_PROBE_PATH       Path to query (default: /live)
//!   PORTGUARD_PROBE_USERNAME   Basic auth username
//!   PORTGUARD_PROBE_PASSWORD   Basic auth password
//!
//! Example Docker HEALTHCHECK:
//!   HEALTHCHECK CMD ["/usr/local/bin/health_probe"]

use std::{process::exit, time::Duration};

use portguard::probe::{probe, ProbeSettings};

#[tokio::main]
async fn main() {
    let settings = match ProbeSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{:#}", err);
            exit(1);
        }
    };

    let url = settings.url();
    let credentials = settings.credentials();

    match probe(&url, credentials.as_ref(), Duration::from_secs(3)).await {
        Ok(status) if status == ::reqwest::StatusCode::OK => {
            println!("Health OK: {}", status);
            exit(0);
        }
        Ok(status) => {
            eprintln!("Unhealthy: {}", status);
            exit(1);
        }
        Err(err) => {
            eprintln!("Request error: {:#}", err);
            exit(1);
        }
    }
}
