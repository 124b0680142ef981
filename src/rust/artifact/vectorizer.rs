use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use lazy_static::lazy_static;
use log::info;
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{decode, encode, read_file, ArtifactError, TextVectorizer, VECTORIZER_FORMAT};
use crate::features::FeatureVector;

/// Default word pattern: runs of two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

lazy_static! {
    static ref WHITE_SPACES: Regex = Regex::new(r"\s\s+").expect("static regex");
    /// Characters whose word-ness differs from the exporting vectorizer's,
    /// where a word character is a letter, a number or `_`. Group 1 is a
    /// word character to this engine only (combining marks, joiners,
    /// connector punctuation); group 2 only to the exporter (`²`, `½`).
    static ref WORD_CLASS_DRIFT: Regex =
        Regex::new(r"([\w--[\p{L}\p{N}_]])|([[\p{L}\p{N}_]--\w])").expect("static regex");
}

const NON_WORD_STAND_IN: char = '\u{FFFD}';
const WORD_STAND_IN: char = '\u{02AC}';

/// Rewrites `text` so that `\w`, `\W`, `\b` and `\B` treat only letters,
/// numbers and `_` as word characters.
///
/// Each drifting character is swapped for a stand-in of the right class.
/// When anything changed, the second value maps every byte offset of the
/// rewritten text (plus its end) back to the original.
fn word_view(text: &str) -> (Cow<'_, str>, Option<Vec<usize>>) {
    if !WORD_CLASS_DRIFT.is_match(text) {
        return (Cow::Borrowed(text), None);
    }

    let mut view = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len() + 1);
    let mut last = 0;
    for caps in WORD_CLASS_DRIFT.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        view.push_str(&text[last..m.start()]);
        origin.extend(last..m.start());

        let stand_in = if caps.get(1).is_some() {
            NON_WORD_STAND_IN
        } else {
            WORD_STAND_IN
        };
        origin.extend(std::iter::repeat(m.start()).take(stand_in.len_utf8()));
        view.push(stand_in);
        last = m.end();
    }
    view.push_str(&text[last..]);
    origin.extend(last..text.len());
    origin.push(text.len());

    (Cow::Owned(view), Some(origin))
}

/// How a document is split into terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Word n-grams from `token_pattern` matches
    #[default]
    Word,
    /// Character n-grams over the whole document
    Char,
    /// Character n-grams inside space-padded words
    CharWb,
}

/// Row normalization applied after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Serialized form of a fitted TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerSpec {
    #[serde(default)]
    pub analyzer: Analyzer,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default)]
    pub stop_words: Vec<String>,
    pub vocabulary: BTreeMap<String, usize>,
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub binary: bool,
}

impl VectorizerSpec {
    /// A word-unigram, l2-normalized spec with no idf weighting
    pub fn new<S: Into<String>>(vocabulary: impl IntoIterator<Item = (S, usize)>) -> Self {
        Self {
            analyzer: Analyzer::Word,
            ngram_range: default_ngram_range(),
            lowercase: true,
            token_pattern: default_token_pattern(),
            stop_words: Vec::new(),
            vocabulary: vocabulary.into_iter().map(|(t, i)| (t.into(), i)).collect(),
            idf: None,
            norm: default_norm(),
            sublinear_tf: false,
            binary: false,
        }
    }

    /// Serializes the spec as a versioned artifact document
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        encode(self, VECTORIZER_FORMAT)
    }
}

/// A fitted TF-IDF text vectorizer.
///
/// Transforms text the same way the exporting vectorizer did at training
/// time: preprocess, split into terms, count in-vocabulary terms, weight by
/// idf and normalize the row.
#[derive(Debug)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    ngram_range: (usize, usize),
    lowercase: bool,
    token_regex: Regex,
    stop_words: HashSet<String>,
    vocabulary: HashMap<String, usize>,
    idf: Option<Array1<f64>>,
    norm: Option<Norm>,
    sublinear_tf: bool,
    binary: bool,
}

impl TfidfVectorizer {
    /// Loads and validates a vectorizer artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let vectorizer = Self::from_json(&read_file(path)?)?;
        info!(
            "Loaded vectorizer from {:?} ({} terms, {:?} analyzer)",
            path,
            vectorizer.vocabulary.len(),
            vectorizer.analyzer
        );
        Ok(vectorizer)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        Self::from_spec(decode(bytes, VECTORIZER_FORMAT)?)
    }

    /// Validates a spec and compiles it into a usable vectorizer.
    ///
    /// Rejects an empty vocabulary, column indices that are not exactly
    /// `0..len`, an idf table of the wrong length, a bad n-gram range and a
    /// token pattern with more than one capture group.
    pub fn from_spec(spec: VectorizerSpec) -> Result<Self, ArtifactError> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::Invalid(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let size = spec.vocabulary.len();
        if size == 0 {
            return Err(ArtifactError::Invalid("Vocabulary is empty".into()));
        }
        let mut seen = vec![false; size];
        for (term, &column) in &spec.vocabulary {
            if column >= size || seen[column] {
                return Err(ArtifactError::Invalid(format!(
                    "Vocabulary column {} for term {:?} is out of range or duplicated",
                    column, term
                )));
            }
            seen[column] = true;
        }

        let idf = match spec.idf {
            Some(weights) => {
                if weights.len() != size {
                    return Err(ArtifactError::Invalid(format!(
                        "idf has {} weights for {} vocabulary terms",
                        weights.len(),
                        size
                    )));
                }
                if weights.iter().any(|w| !w.is_finite()) {
                    return Err(ArtifactError::Invalid("idf contains non-finite weights".into()));
                }
                Some(Array1::from(weights))
            }
            None => None,
        };

        let token_regex = Regex::new(&spec.token_pattern)
            .map_err(|e| ArtifactError::Invalid(format!("Invalid token_pattern: {}", e)))?;
        if token_regex.captures_len() > 2 {
            return Err(ArtifactError::Invalid(
                "token_pattern may contain at most one capture group".into(),
            ));
        }

        Ok(Self {
            analyzer: spec.analyzer,
            ngram_range: spec.ngram_range,
            lowercase: spec.lowercase,
            token_regex,
            stop_words: spec.stop_words.into_iter().collect(),
            vocabulary: spec.vocabulary.into_iter().collect(),
            idf,
            norm: spec.norm,
            sublinear_tf: spec.sublinear_tf,
            binary: spec.binary,
        })
    }

    /// Splits a document into the terms that are looked up in the vocabulary
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        match self.analyzer {
            Analyzer::Word => self.word_ngrams(self.tokenize(&text)),
            Analyzer::Char => self.char_ngrams(&text),
            Analyzer::CharWb => self.char_wb_ngrams(&text),
        }
    }

    /// Token pattern matches, with word classes as the exporter saw them.
    ///
    /// A literal combining mark in the pattern never matches, since marks
    /// are replaced before matching.
    fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let (view, origin) = word_view(text);
        let span = |m: regex::Match<'_>| -> &'t str {
            match &origin {
                Some(origin) => &text[origin[m.start()]..origin[m.end()]],
                None => &text[m.range()],
            }
        };

        // A single capture group selects the token inside the match.
        if self.token_regex.captures_len() == 2 {
            self.token_regex
                .captures_iter(&view)
                .filter_map(|caps| caps.get(1).map(span))
                .collect()
        } else {
            self.token_regex.find_iter(&view).map(span).collect()
        }
    }

    fn word_ngrams(&self, tokens: Vec<&str>) -> Vec<String> {
        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(*t))
            .collect();
        let (min_n, max_n) = self.ngram_range;

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn char_ngrams(&self, text: &str) -> Vec<String> {
        let text = WHITE_SPACES.replace_all(text, " ");
        let chars: Vec<char> = text.chars().collect();
        let (min_n, max_n) = self.ngram_range;

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(chars.len()) {
            for window in chars.windows(n) {
                terms.push(window.iter().collect());
            }
        }
        terms
    }

    fn char_wb_ngrams(&self, text: &str) -> Vec<String> {
        let text = WHITE_SPACES.replace_all(text, " ");
        let (min_n, max_n) = self.ngram_range;

        let mut terms = Vec::new();
        for word in text.split_whitespace() {
            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            for n in min_n..=max_n {
                if padded.len() <= n {
                    // A word shorter than n is counted once, whole.
                    terms.push(padded.iter().collect());
                    break;
                }
                for window in padded.windows(n) {
                    terms.push(window.iter().collect());
                }
            }
        }
        terms
    }

    /// Transforms one document into a weighted, normalized feature row
    pub fn transform_one(&self, text: &str) -> FeatureVector {
        let dim = self.vocabulary.len();
        let counts = self
            .analyze(text)
            .into_iter()
            .filter_map(|term| self.vocabulary.get(term.as_str()).copied())
            .map(|column| (column, 1.0));
        let mut row = FeatureVector::from_pairs(dim, counts);

        if self.binary {
            row.map_values(|_| 1.0);
        }
        if self.sublinear_tf {
            row.map_values(|tf| 1.0 + tf.ln());
        }
        if let Some(idf) = &self.idf {
            row = FeatureVector::from_pairs(
                dim,
                row.entries().iter().map(|&(i, v)| (i, v * idf[i])),
            );
        }
        match self.norm {
            Some(Norm::L2) => {
                let norm = row.l2_norm();
                row.scale_to_unit(norm);
            }
            Some(Norm::L1) => {
                let norm = row.l1_norm();
                row.scale_to_unit(norm);
            }
            None => {}
        }
        row
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    fn transform(&self, documents: &[&str]) -> Vec<FeatureVector> {
        documents.iter().map(|doc| self.transform_one(doc)).collect()
    }
}
