//! Pre-trained model artifacts and their on-disk format.
//!
//! Every artifact is a JSON document carrying a `format` tag and a schema
//! `version` next to its payload:
//!
//! ```json
//! { "format": "lammah.vectorizer", "version": 1, "vocabulary": { "رائع": 0 }, "idf": [1.0] }
//! ```
//!
//! Readers refuse documents whose tag or version they do not know.

mod classifier;
mod error;
mod vectorizer;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use classifier::{ClassifierKind, ClassifierSpec, LinearClassifier};
pub use error::ArtifactError;
pub use vectorizer::{Analyzer, Norm, TfidfVectorizer, VectorizerSpec, DEFAULT_TOKEN_PATTERN};

use crate::features::FeatureVector;
use crate::labels::ClassKey;

/// Schema version written and accepted by this build
pub const SCHEMA_VERSION: u32 = 1;

/// Format tag of vectorizer artifacts
pub const VECTORIZER_FORMAT: &str = "lammah.vectorizer";

/// Format tag of classifier artifacts
pub const CLASSIFIER_FORMAT: &str = "lammah.classifier";

/// Turns raw documents into feature rows.
pub trait TextVectorizer: Send + Sync {
    /// Width of every row this vectorizer produces
    fn dimension(&self) -> usize;

    /// Transforms each document into one feature row, in order
    fn transform(&self, documents: &[&str]) -> Vec<FeatureVector>;
}

/// Maps feature rows to class keys.
pub trait TextClassifier: Send + Sync {
    /// Every key this classifier can emit
    fn classes(&self) -> &[ClassKey];

    /// Expected width of the input rows
    fn n_features(&self) -> usize;

    /// Predicts one class key per row
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<ClassKey>, ArtifactError>;
}

#[derive(Deserialize)]
struct Envelope {
    format: String,
    version: u32,
}

#[derive(Serialize)]
struct Enveloped<'a, T: Serialize> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    body: &'a T,
}

/// Decodes an artifact body after checking its envelope.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8], format: &'static str) -> Result<T, ArtifactError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let envelope = Envelope::deserialize(&value)?;

    if envelope.format != format {
        return Err(ArtifactError::UnsupportedFormat {
            expected: format,
            found: envelope.format,
        });
    }
    if envelope.version != SCHEMA_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            format,
            found: envelope.version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(serde_json::from_value(value)?)
}

/// Encodes an artifact body with its envelope.
pub(crate) fn encode<T: Serialize>(body: &T, format: &'static str) -> Result<String, ArtifactError> {
    let doc = Enveloped {
        format,
        version: SCHEMA_VERSION,
        body,
    };
    Ok(serde_json::to_string(&doc)?)
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_format() {
        let doc = br#"{"format": "lammah.classifier", "version": 1, "vocabulary": {}}"#;
        let err = decode::<VectorizerSpec>(doc, VECTORIZER_FORMAT).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsupportedFormat { found, .. } if found == "lammah.classifier"));
    }

    #[test]
    fn test_rejects_future_version() {
        let doc = br#"{"format": "lammah.vectorizer", "version": 2, "vocabulary": {"a": 0}}"#;
        let err = decode::<VectorizerSpec>(doc, VECTORIZER_FORMAT).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsupportedVersion { found: 2, supported: 1, .. }));
    }

    #[test]
    fn test_rejects_missing_envelope() {
        let doc = br#"{"vocabulary": {"a": 0}}"#;
        assert!(matches!(
            decode::<VectorizerSpec>(doc, VECTORIZER_FORMAT),
            Err(ArtifactError::Json(_))
        ));
    }

    #[test]
    fn test_encode_writes_envelope() {
        let spec = VectorizerSpec::new([("a", 0)]);
        let json = encode(&spec, VECTORIZER_FORMAT).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format"], VECTORIZER_FORMAT);
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert_eq!(value["vocabulary"]["a"], 0);
    }
}
