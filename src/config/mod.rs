#[cfg(feature = "cli")]
pub mod cli;
pub mod profile;
pub mod request;
pub mod storage;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use profile::Profile;
pub use request::ScrapeRequest;
pub use storage::LocalStorage;
