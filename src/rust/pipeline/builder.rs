use std::path::Path;
use std::sync::Arc;

use log::{error, info};

use super::error::PipelineError;
use super::pipeline::ClassifierPipeline;
use crate::artifact::{
    ClassifierSpec, LinearClassifier, TextClassifier, TextVectorizer, TfidfVectorizer, VectorizerSpec,
};
use crate::labels::LabelMap;
use crate::Task;

/// A builder for constructing a [`ClassifierPipeline`] with a fluent interface.
pub struct PipelineBuilder {
    task: Task,
    vectorizer: Option<Arc<dyn TextVectorizer>>,
    classifier: Option<Arc<dyn TextClassifier>>,
    labels: Option<LabelMap>,
    vectorizer_path: Option<String>,
    model_path: Option<String>,
}

impl PipelineBuilder {
    /// Creates an empty builder for `task`
    pub fn new(task: Task) -> Self {
        Self {
            task,
            vectorizer: None,
            classifier: None,
            labels: None,
            vectorizer_path: None,
            model_path: None,
        }
    }

    /// Uses an already constructed vectorizer
    pub fn with_vectorizer(mut self, vectorizer: impl TextVectorizer + 'static) -> Self {
        self.vectorizer = Some(Arc::new(vectorizer));
        self
    }

    /// Uses an already constructed classifier
    pub fn with_classifier(mut self, classifier: impl TextClassifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Compiles an in-memory vectorizer spec
    pub fn with_vectorizer_spec(self, spec: VectorizerSpec) -> Result<Self, PipelineError> {
        Ok(self.with_vectorizer(TfidfVectorizer::from_spec(spec)?))
    }

    /// Compiles an in-memory classifier spec
    pub fn with_classifier_spec(self, spec: ClassifierSpec) -> Result<Self, PipelineError> {
        Ok(self.with_classifier(LinearClassifier::from_spec(spec)?))
    }

    /// Loads the vectorizer artifact at `path`
    ///
    /// # Errors
    /// - `BuildError` if a vectorizer file was already loaded
    /// - `Artifact` if the file is missing, malformed or invalid
    pub fn with_vectorizer_file(mut self, path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if self.vectorizer_path.is_some() {
            return Err(PipelineError::BuildError("Vectorizer path already set".to_string()));
        }

        let vectorizer = TfidfVectorizer::from_file(path).map_err(|e| {
            error!("[{}] Failed to load vectorizer {:?}: {}", self.task, path, e);
            e
        })?;

        self.vectorizer_path = Some(path.to_string_lossy().to_string());
        Ok(self.with_vectorizer(vectorizer))
    }

    /// Loads the classifier artifact at `path`
    ///
    /// # Errors
    /// - `BuildError` if a classifier file was already loaded
    /// - `Artifact` if the file is missing, malformed or invalid
    pub fn with_classifier_file(mut self, path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if self.model_path.is_some() {
            return Err(PipelineError::BuildError("Model path already set".to_string()));
        }

        let classifier = LinearClassifier::from_file(path).map_err(|e| {
            error!("[{}] Failed to load classifier {:?}: {}", self.task, path, e);
            e
        })?;

        self.model_path = Some(path.to_string_lossy().to_string());
        Ok(self.with_classifier(classifier))
    }

    /// Sets the label map; defaults to [`LabelMap::builtin`] for the task
    pub fn with_labels(mut self, labels: LabelMap) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Builds and returns the final pipeline
    ///
    /// # Errors
    /// - `BuildError` if the vectorizer or classifier is missing
    /// - `BuildError` if the label map is empty
    /// - `BuildError` if the vectorizer width differs from the classifier's
    pub fn build(self) -> Result<ClassifierPipeline, PipelineError> {
        let vectorizer = self
            .vectorizer
            .ok_or_else(|| PipelineError::BuildError("No vectorizer loaded".into()))?;
        let classifier = self
            .classifier
            .ok_or_else(|| PipelineError::BuildError("No classifier loaded".into()))?;
        let labels = self.labels.unwrap_or_else(|| LabelMap::builtin(self.task));

        if labels.is_empty() {
            return Err(PipelineError::BuildError("Label map is empty".into()));
        }
        if vectorizer.dimension() != classifier.n_features() {
            return Err(PipelineError::BuildError(format!(
                "Vectorizer produces {} features but the classifier expects {}",
                vectorizer.dimension(),
                classifier.n_features()
            )));
        }

        info!(
            "[{}] Pipeline ready: {} features, {} classes",
            self.task,
            classifier.n_features(),
            classifier.classes().len()
        );

        Ok(ClassifierPipeline {
            task: self.task,
            vectorizer,
            classifier,
            labels: Arc::new(labels),
            vectorizer_path: self.vectorizer_path,
            model_path: self.model_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactError;
    use std::fs;

    fn vectorizer_spec() -> VectorizerSpec {
        VectorizerSpec::new([("رائع", 0), ("سيء", 1)])
    }

    fn classifier_spec(n_features: usize) -> ClassifierSpec {
        ClassifierSpec::Linear {
            classes: vec![0.into(), 1.into()],
            coef: vec![vec![0.5; n_features]],
            intercept: vec![0.0],
        }
    }

    #[test]
    fn test_missing_parts() {
        let result = PipelineBuilder::new(Task::Sentiment).build();
        assert!(matches!(result, Err(PipelineError::BuildError(_))));

        let result = PipelineBuilder::new(Task::Sentiment)
            .with_vectorizer_spec(vectorizer_spec())
            .unwrap()
            .build();
        assert!(matches!(result, Err(PipelineError::BuildError(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = PipelineBuilder::new(Task::Sentiment)
            .with_vectorizer_spec(vectorizer_spec())
            .unwrap()
            .with_classifier_spec(classifier_spec(3))
            .unwrap()
            .build();
        assert!(matches!(result, Err(PipelineError::BuildError(msg)) if msg.contains("expects 3")));
    }

    #[test]
    fn test_default_labels_are_builtin() {
        let pipeline = PipelineBuilder::new(Task::Sentiment)
            .with_vectorizer_spec(vectorizer_spec())
            .unwrap()
            .with_classifier_spec(classifier_spec(2))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(pipeline.label_map(), &LabelMap::builtin(Task::Sentiment));
    }

    #[test]
    fn test_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let vectorizer_path = dir.path().join("vectorizer.json");
        let model_path = dir.path().join("model.json");
        fs::write(&vectorizer_path, vectorizer_spec().to_json()?)?;
        fs::write(&model_path, classifier_spec(2).to_json()?)?;

        let pipeline = PipelineBuilder::new(Task::Sentiment)
            .with_vectorizer_file(&vectorizer_path)?
            .with_classifier_file(&model_path)?
            .build()?;
        assert_eq!(pipeline.info().model_path, Some(model_path.to_string_lossy().to_string()));

        let again = PipelineBuilder::new(Task::Sentiment)
            .with_vectorizer_file(&vectorizer_path)?
            .with_vectorizer_file(&vectorizer_path);
        assert!(matches!(again, Err(PipelineError::BuildError(_))));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = PipelineBuilder::new(Task::Article).with_classifier_file("/nonexistent/model.json");
        assert!(matches!(
            result,
            Err(PipelineError::Artifact(ArtifactError::Io { .. }))
        ));
    }
}
