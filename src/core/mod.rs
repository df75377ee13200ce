pub mod collector;
pub mod etl;
pub mod filter;
pub mod flatten;
pub mod normalize;
pub mod pipeline;

pub use crate::domain::ports::{MediaSource, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
