use std::path::{Path, PathBuf};

use crate::labels::LabelMap;
use crate::Task;

/// File name of a task's vectorizer inside its artifact directory
pub const VECTORIZER_FILE: &str = "vectorizer.json";

/// File name of a task's classifier inside its artifact directory
pub const MODEL_FILE: &str = "model.json";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

/// Where one task's artifacts live and which labels its outputs map to.
#[derive(Debug, Clone)]
pub struct TaskSource {
    pub task: Task,
    pub vectorizer_path: PathBuf,
    pub model_path: PathBuf,
    pub labels: LabelMap,
}

impl TaskSource {
    /// Artifact paths relative to an artifacts directory, `/`-separated
    pub fn relative_paths(task: Task) -> [String; 2] {
        [
            format!("{}/{}", task.as_str(), VECTORIZER_FILE),
            format!("{}/{}", task.as_str(), MODEL_FILE),
        ]
    }

    /// The standard layout: `<dir>/<task>/vectorizer.json` and `<dir>/<task>/model.json`
    pub fn in_dir(dir: &Path, task: Task) -> Self {
        let task_dir = dir.join(task.as_str());
        Self {
            task,
            vectorizer_path: task_dir.join(VECTORIZER_FILE),
            model_path: task_dir.join(MODEL_FILE),
            labels: LabelMap::builtin(task),
        }
    }
}

/// The fixed table the registry is built from.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    pub sources: Vec<TaskSource>,
}

impl RegistryConfig {
    /// All three tasks in the standard layout under `dir`
    pub fn from_artifacts_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            sources: Task::ALL.iter().map(|&task| TaskSource::in_dir(dir, task)).collect(),
        }
    }

    /// Replaces the source for `source.task`, or adds it
    pub fn with_source(mut self, source: TaskSource) -> Self {
        self.sources.retain(|s| s.task != source.task);
        self.sources.push(source);
        self
    }

    pub fn source(&self, task: Task) -> Option<&TaskSource> {
        self.sources.iter().find(|s| s.task == task)
    }
}

/// Settings of the HTTP front-end
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}
