pub mod campaign_url;
pub mod classifier;
pub mod dataset;
pub mod etl;
pub mod matchers;
pub mod patterns;
pub mod pipeline;
pub mod suggestions;
pub mod text;

pub use crate::domain::model::TransformResult;
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
