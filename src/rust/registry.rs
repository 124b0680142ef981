//! The three task pipelines, loaded together at startup.
//!
//! Loading is all-or-nothing: if any artifact is missing or corrupt, or if
//! a classifier can emit a class its label map does not cover, the whole
//! registry fails and nothing is served.

use log::{error, info};

use crate::config::{RegistryConfig, TaskSource};
use crate::labels::ClassKey;
use crate::pipeline::{ClassifierPipeline, PipelineError};
use crate::Task;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No artifact source configured for the {0} task")]
    MissingTask(Task),
    #[error("Failed to load the {task} pipeline: {source}")]
    Load {
        task: Task,
        #[source]
        source: PipelineError,
    },
    #[error("The {task} classifier emits classes without labels: {classes:?}")]
    MissingLabels { task: Task, classes: Vec<ClassKey> },
    #[error("Pipeline for {found} registered as {expected}")]
    TaskMismatch { expected: Task, found: Task },
}

/// Owns one [`ClassifierPipeline`] per [`Task`].
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    sentiment: ClassifierPipeline,
    article: ClassifierPipeline,
    dialect: ClassifierPipeline,
}

impl TaskRegistry {
    /// Loads every task's artifacts from the table in `config`.
    pub fn load(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let load = |task: Task| -> Result<ClassifierPipeline, RegistryError> {
            let source = config.source(task).ok_or(RegistryError::MissingTask(task))?;
            Self::load_source(source).map_err(|source| {
                error!("[{}] Pipeline failed to load: {}", task, source);
                RegistryError::Load { task, source }
            })
        };

        let registry = Self::from_pipelines(load(Task::Sentiment)?, load(Task::Article)?, load(Task::Dialect)?)?;
        info!("Task registry loaded ({} pipelines)", Task::ALL.len());
        Ok(registry)
    }

    fn load_source(source: &TaskSource) -> Result<ClassifierPipeline, PipelineError> {
        info!(
            "[{}] Loading artifacts: vectorizer {:?}, model {:?}",
            source.task, source.vectorizer_path, source.model_path
        );
        ClassifierPipeline::builder(source.task)
            .with_vectorizer_file(&source.vectorizer_path)?
            .with_classifier_file(&source.model_path)?
            .with_labels(source.labels.clone())
            .build()
    }

    /// Assembles a registry from already built pipelines.
    ///
    /// Each pipeline must serve the task of its slot and have a label for
    /// every class its classifier can emit.
    pub fn from_pipelines(
        sentiment: ClassifierPipeline,
        article: ClassifierPipeline,
        dialect: ClassifierPipeline,
    ) -> Result<Self, RegistryError> {
        for (expected, pipeline) in [
            (Task::Sentiment, &sentiment),
            (Task::Article, &article),
            (Task::Dialect, &dialect),
        ] {
            if pipeline.task() != expected {
                return Err(RegistryError::TaskMismatch {
                    expected,
                    found: pipeline.task(),
                });
            }
            let classes = pipeline.uncovered_classes();
            if !classes.is_empty() {
                error!("[{}] Label map does not cover classes {:?}", expected, classes);
                return Err(RegistryError::MissingLabels { task: expected, classes });
            }
        }

        Ok(Self {
            sentiment,
            article,
            dialect,
        })
    }

    pub fn get(&self, task: Task) -> &ClassifierPipeline {
        match task {
            Task::Sentiment => &self.sentiment,
            Task::Article => &self.article,
            Task::Dialect => &self.dialect,
        }
    }
}
