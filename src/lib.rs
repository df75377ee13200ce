pub mod clients;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, Profile, ScrapeRequest};

pub use clients::{HikerClient, InstagramSource, LamatokClient, TikTokSource};
pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::ScrapePipeline,
};
pub use utils::error::{Result, ScoutError};
