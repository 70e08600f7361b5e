pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::classifier::{channel_rule, rules, ChannelClassifier, ChannelRule};
pub use core::dataset::{load_reference_dataset, DatasetLoader, DatasetSource, ReferenceDataset};
pub use core::suggestions::SuggestionProvider;
pub use core::{etl::EtlEngine, pipeline::CsvClassificationPipeline};
pub use domain::model::{Alignment, Category, Channel, ClassificationInput};
pub use utils::error::{EtlError, Result};
