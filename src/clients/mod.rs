// Platform API clients. `http` holds the shared request/response handling.

pub mod http;
pub mod instagram;
pub mod tiktok;

pub use instagram::{HikerClient, InstagramSource};
pub use tiktok::{LamatokClient, TikTokSource};
