use std::fmt;
use std::sync::Arc;

use log::debug;

use super::error::PipelineError;
use super::PipelineInfo;
use crate::artifact::{TextClassifier, TextVectorizer};
use crate::labels::{ClassKey, LabelMap};
use crate::Task;

/// Outcome of one prediction: the raw class key and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub class: ClassKey,
    pub label: String,
}

/// One task's inference path: vectorize, classify, look up the label.
///
/// # Thread Safety
///
/// All fields are immutable after construction and held behind `Arc`, so a
/// pipeline can be shared across request handlers without locking.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use lammah::{ClassifierPipeline, ClassifierSpec, LabelMap, Task, VectorizerSpec};
///
/// let pipeline = ClassifierPipeline::builder(Task::Sentiment)
///     .with_vectorizer_spec(VectorizerSpec::new([("رائع", 0), ("سيء", 1)]))?
///     .with_classifier_spec(ClassifierSpec::Linear {
///         classes: vec![0.into(), 1.into()],
///         coef: vec![vec![1.0, -1.0]],
///         intercept: vec![0.0],
///     })?
///     .with_labels(LabelMap::builtin(Task::Sentiment))
///     .build()?;
///
/// assert_eq!(pipeline.predict("رائع جدا")?, "إيجابي");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClassifierPipeline {
    pub(crate) task: Task,
    pub(crate) vectorizer: Arc<dyn TextVectorizer>,
    pub(crate) classifier: Arc<dyn TextClassifier>,
    pub(crate) labels: Arc<LabelMap>,
    pub(crate) vectorizer_path: Option<String>,
    pub(crate) model_path: Option<String>,
}

// Compile-time verification of thread-safety
#[allow(dead_code)]
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ClassifierPipeline>();
    }
};

impl fmt::Debug for ClassifierPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierPipeline")
            .field("task", &self.task)
            .field("n_features", &self.classifier.n_features())
            .field("classes", &self.classifier.classes())
            .field("vectorizer_path", &self.vectorizer_path)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl ClassifierPipeline {
    /// Creates a PipelineBuilder for fluent construction
    pub fn builder(task: Task) -> super::builder::PipelineBuilder {
        super::builder::PipelineBuilder::new(task)
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.labels
    }

    /// Predicts the display label for `text`.
    ///
    /// The caller is responsible for rejecting empty input; the pipeline
    /// classifies whatever it is given.
    ///
    /// # Errors
    /// - `UnknownClass` if the classifier emits a key with no label
    /// - `Artifact` if the feature row does not fit the classifier
    pub fn predict(&self, text: &str) -> Result<String, PipelineError> {
        self.predict_detailed(text).map(|prediction| prediction.label)
    }

    /// Like [`predict`](Self::predict) but also returns the raw class key
    pub fn predict_detailed(&self, text: &str) -> Result<Prediction, PipelineError> {
        let rows = self.vectorizer.transform(&[text]);
        debug!(
            "[{}] feature row has {} non-zero entries",
            self.task,
            rows.first().map(|r| r.nnz()).unwrap_or(0)
        );

        let class = self
            .classifier
            .predict(&rows)?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::PredictionError("Classifier returned no prediction".into()))?;

        let label = self
            .labels
            .get(&class)
            .ok_or_else(|| PipelineError::UnknownClass {
                task: self.task,
                class: class.clone(),
            })?
            .to_string();

        Ok(Prediction { class, label })
    }

    /// Every key the classifier can emit
    pub fn possible_outputs(&self) -> &[ClassKey] {
        self.classifier.classes()
    }

    /// Classifier keys that have no entry in the label map
    pub fn uncovered_classes(&self) -> Vec<ClassKey> {
        self.labels.uncovered(self.classifier.classes())
    }

    /// Returns information about the pipeline's configuration
    pub fn info(&self) -> PipelineInfo {
        PipelineInfo {
            task: self.task,
            vectorizer_path: self.vectorizer_path.clone(),
            model_path: self.model_path.clone(),
            n_features: self.classifier.n_features(),
            classes: self.classifier.classes().to_vec(),
            labels: self.labels.labels().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactError;
    use crate::features::FeatureVector;

    /// Width-1 vectorizer whose only feature is the character count
    struct LengthVectorizer;

    impl TextVectorizer for LengthVectorizer {
        fn dimension(&self) -> usize {
            1
        }

        fn transform(&self, documents: &[&str]) -> Vec<FeatureVector> {
            documents
                .iter()
                .map(|d| FeatureVector::from_pairs(1, [(0, d.chars().count() as f64)]))
                .collect()
        }
    }

    /// Emits `long` for rows above a threshold, `short` otherwise
    struct ThresholdClassifier {
        classes: Vec<ClassKey>,
    }

    impl TextClassifier for ThresholdClassifier {
        fn classes(&self) -> &[ClassKey] {
            &self.classes
        }

        fn n_features(&self) -> usize {
            1
        }

        fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<ClassKey>, ArtifactError> {
            Ok(rows
                .iter()
                .map(|r| self.classes[usize::from(r.get(0) > 5.0)].clone())
                .collect())
        }
    }

    fn pipeline(labels: LabelMap) -> ClassifierPipeline {
        ClassifierPipeline::builder(Task::Dialect)
            .with_vectorizer(LengthVectorizer)
            .with_classifier(ThresholdClassifier {
                classes: vec!["short".into(), "long".into()],
            })
            .with_labels(labels)
            .build()
            .unwrap()
    }

    #[test]
    fn test_predict_maps_label() {
        let p = pipeline(LabelMap::new().with_label("short", "قصير").with_label("long", "طويل"));
        assert_eq!(p.predict("abc").unwrap(), "قصير");
        let detailed = p.predict_detailed("abcdefgh").unwrap();
        assert_eq!(detailed.class, ClassKey::from("long"));
        assert_eq!(detailed.label, "طويل");
    }

    #[test]
    fn test_missing_label_fails() {
        let p = pipeline(LabelMap::new().with_label("short", "قصير"));
        assert_eq!(p.uncovered_classes(), vec![ClassKey::from("long")]);
        assert!(p.predict("abc").is_ok());
        match p.predict("abcdefgh") {
            Err(PipelineError::UnknownClass { task, class }) => {
                assert_eq!(task, Task::Dialect);
                assert_eq!(class, ClassKey::from("long"));
            }
            other => panic!("expected UnknownClass, got {:?}", other),
        }
    }

    #[test]
    fn test_info() {
        let p = pipeline(LabelMap::new().with_label("short", "قصير").with_label("long", "طويل"));
        let info = p.info();
        assert_eq!(info.task, Task::Dialect);
        assert_eq!(info.n_features, 1);
        assert_eq!(info.classes.len(), 2);
        assert!(info.model_path.is_none());
    }
}
