mod builder;
mod error;
mod pipeline;

pub use builder::PipelineBuilder;
pub use error::PipelineError;
pub use pipeline::{ClassifierPipeline, Prediction};

use crate::labels::ClassKey;
use crate::Task;

/// Information about a loaded pipeline
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    /// Task this pipeline serves
    pub task: Task,
    /// Path of the vectorizer artifact, when loaded from disk
    pub vectorizer_path: Option<String>,
    /// Path of the classifier artifact, when loaded from disk
    pub model_path: Option<String>,
    /// Width of the feature rows
    pub n_features: usize,
    /// Every key the classifier can emit
    pub classes: Vec<ClassKey>,
    /// Display strings of the label map
    pub labels: Vec<String>,
}
