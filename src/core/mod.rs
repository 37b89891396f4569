pub mod adapter;
pub mod config;

pub use adapter::{BankAdapter, Credentials};
pub use config::{BrowserConfig, Config, LoggingConfig};
