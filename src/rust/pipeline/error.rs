use crate::artifact::ArtifactError;
use crate::labels::ClassKey;
use crate::Task;

/// Errors raised while building or running a [`ClassifierPipeline`](super::ClassifierPipeline).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An artifact could not be loaded or applied
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    /// The builder was given an incomplete or inconsistent setup
    #[error("Build error: {0}")]
    BuildError(String),
    /// The classifier emitted a key the label map does not know
    #[error("No label for class '{class}' in the {task} label map")]
    UnknownClass { task: Task, class: ClassKey },
    /// The classifier returned no result for the input
    #[error("Prediction error: {0}")]
    PredictionError(String),
}
