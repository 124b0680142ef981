//! Arabic text classification for three tasks: sentiment, article topic and
//! dialect, served behind a small web shell.
//!
//! Each task is a [`ClassifierPipeline`]: a fitted TF-IDF vectorizer, a
//! linear classifier and a [`LabelMap`] turning class keys into Arabic
//! display labels. The [`TaskRegistry`] loads all three at startup.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lammah::{ClassifierPipeline, ClassifierSpec, LabelMap, Task, VectorizerSpec};
//!
//! let pipeline = ClassifierPipeline::builder(Task::Article)
//!     .with_vectorizer_spec(VectorizerSpec::new([("الاقتصاد", 0), ("المباراة", 1)]))?
//!     .with_classifier_spec(ClassifierSpec::Linear {
//!         classes: vec![2.into(), 4.into()],
//!         coef: vec![vec![-1.0, 1.0]],
//!         intercept: vec![0.0],
//!     })?
//!     .with_labels(LabelMap::builtin(Task::Article))
//!     .build()?;
//!
//! assert_eq!(pipeline.predict("فاز الفريق في المباراة")?, "رياضة");
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Pipelines and the registry are immutable once built and can be shared
//! across threads using `Arc`:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lammah::{ClassifierPipeline, ClassifierSpec, Task, VectorizerSpec};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let pipeline = Arc::new(ClassifierPipeline::builder(Task::Sentiment)
//!     .with_vectorizer_spec(VectorizerSpec::new([("رائع", 0), ("سيء", 1)]))?
//!     .with_classifier_spec(ClassifierSpec::Linear {
//!         classes: vec![0.into(), 1.into()],
//!         coef: vec![vec![1.0, -1.0]],
//!         intercept: vec![0.0],
//!     })?
//!     .build()?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let pipeline = Arc::clone(&pipeline);
//!     handles.push(thread::spawn(move || {
//!         pipeline.predict("فيلم رائع").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod artifact_store;
pub mod config;
pub mod features;
pub mod labels;
pub mod pipeline;
pub mod registry;
pub mod shell;
mod task;

pub use artifact::{
    ArtifactError, ClassifierKind, ClassifierSpec, LinearClassifier, TextClassifier, TextVectorizer,
    TfidfVectorizer, VectorizerSpec,
};
pub use artifact_store::{ArtifactStore, Manifest, StoreError};
pub use config::{RegistryConfig, ServerConfig, TaskSource};
pub use features::FeatureVector;
pub use labels::{ClassKey, LabelMap};
pub use pipeline::{ClassifierPipeline, PipelineBuilder, PipelineError, PipelineInfo, Prediction};
pub use registry::{RegistryError, TaskRegistry};
pub use task::{Task, UnknownTask};

pub fn init_logger() {
    env_logger::init();
}
