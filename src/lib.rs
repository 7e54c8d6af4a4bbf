pub mod auth;
pub mod checker;
pub mod config;
pub(crate) mod handlers;
pub mod health;
pub mod probe;
pub mod server;
pub mod version;

pub use config::Config;
pub use health::HealthReport;
pub use server::{run, ServerStarter, WarpStarter};
