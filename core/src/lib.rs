pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod hub;
pub mod naming;
pub mod runner;
pub mod scan;
pub mod transform;
pub mod worker;

pub use config::BatchConfig;
pub use error::ProcessingError;
pub use events::{BatchEvent, Outcome};
pub use format::{SourceFormat, TargetFormat};
pub use hub::ProgressHub;
pub use naming::RunTag;
pub use runner::BatchRunner;
pub use scan::WorkItem;
pub use transform::{CodecTransform, ImageTransform};
