#![allow(dead_code)]

use std::fs;
use std::path::Path;

use env_logger::{Builder, Env};
use lammah::artifact_store::{sha256_hex, MANIFEST_FILE};
use lammah::config::TaskSource;
use lammah::{ClassifierSpec, Manifest, Task, VectorizerSpec};

pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

pub fn vectorizer_spec(task: Task) -> VectorizerSpec {
    match task {
        Task::Sentiment => VectorizerSpec::new([("رائع", 0), ("جميل", 1), ("سيء", 2), ("ممل", 3)]),
        Task::Article => VectorizerSpec::new([
            ("الرواية", 0),
            ("المهرجان", 1),
            ("الاقتصاد", 2),
            ("الانتخابات", 3),
            ("الفريق", 4),
            ("بالمباراة", 5),
        ]),
        Task::Dialect => VectorizerSpec::new([
            ("ازيك", 0),
            ("شلونك", 1),
            ("كيفك", 2),
            ("لاباس", 3),
            ("شنو", 4),
        ]),
    }
}

pub fn classifier_spec(task: Task) -> ClassifierSpec {
    match task {
        Task::Sentiment => ClassifierSpec::Linear {
            classes: vec![0.into(), 1.into()],
            coef: vec![vec![1.5, 1.0, -1.5, -1.0]],
            intercept: vec![-0.1],
        },
        Task::Article => ClassifierSpec::Linear {
            classes: (0..5).map(Into::into).collect(),
            coef: vec![
                vec![2.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.0, 2.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 2.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
            ],
            intercept: vec![0.0, 0.1, 0.0, 0.0, 0.0],
        },
        Task::Dialect => {
            let high = 0.6f64.ln();
            let low = 0.1f64.ln();
            ClassifierSpec::MultinomialNb {
                classes: ["Egyptian", "Gulf", "Levantine", "Maghrebi", "Sudanese-Iraqi"]
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                feature_log_prob: (0..5)
                    .map(|i| (0..5).map(|j| if i == j { high } else { low }).collect())
                    .collect(),
                class_log_prior: vec![0.2f64.ln(); 5],
            }
        }
    }
}

/// Writes one task's artifacts in the standard layout and returns their bytes
pub fn write_task(dir: &Path, task: Task, classifier: &ClassifierSpec) -> Result<[Vec<u8>; 2], Box<dyn std::error::Error>> {
    let source = TaskSource::in_dir(dir, task);
    fs::create_dir_all(dir.join(task.as_str()))?;
    let vectorizer = vectorizer_spec(task).to_json()?.into_bytes();
    let model = classifier.to_json()?.into_bytes();
    fs::write(&source.vectorizer_path, &vectorizer)?;
    fs::write(&source.model_path, &model)?;
    Ok([vectorizer, model])
}

/// Writes a complete artifact set, and its manifest when asked
pub fn write_artifacts(dir: &Path, with_manifest: bool) -> Result<Manifest, Box<dyn std::error::Error>> {
    let mut manifest = Manifest::default();
    for task in Task::ALL {
        let bytes = write_task(dir, task, &classifier_spec(task))?;
        for (file, content) in TaskSource::relative_paths(task).into_iter().zip(bytes) {
            manifest.files.insert(file, sha256_hex(&content));
        }
    }
    if with_manifest {
        fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;
    }
    Ok(manifest)
}
