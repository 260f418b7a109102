//! searchmon agent - CLI front end of the RediSearch fleet monitor
//!
//! - Parses the command line (build number, config path)
//! - Loads the YAML configuration
//! - Runs the kernel collector against the configured Redis instances
//! - Prints the console report and posts the MessageCard webhook

pub mod cli;
pub mod config;
pub mod monitor;
pub mod notifier;

pub use cli::Cli;
pub use config::{ConfigError, MonitorConfig};
pub use monitor::{run, Delivery};
pub use notifier::{NotifyError, WebhookNotifier};
