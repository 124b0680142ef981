//! Display labels for classifier outputs.
//!
//! A classifier emits a [`ClassKey`]: the sentiment and article models emit
//! integer indices, the dialect model emits region names. Each task has a
//! fixed [`LabelMap`] that turns those keys into the Arabic strings shown to
//! the user.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Task;

/// A class identifier as stored in a classifier artifact.
///
/// Serialized as a bare JSON number or string, so `[0, 1]` and
/// `["Gulf", "Maghrebi"]` are both valid class lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassKey {
    Index(i64),
    Name(String),
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ClassKey {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<i32> for ClassKey {
    fn from(index: i32) -> Self {
        Self::Index(i64::from(index))
    }
}

impl From<&str> for ClassKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Lookup table from [`ClassKey`] to a human readable category name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: BTreeMap<ClassKey, String>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one entry
    pub fn with_label(mut self, key: impl Into<ClassKey>, label: impl Into<String>) -> Self {
        self.entries.insert(key.into(), label.into());
        self
    }

    /// The fixed table the app ships for `task`
    pub fn builtin(task: Task) -> Self {
        match task {
            Task::Sentiment => Self::new()
                .with_label(0, "سلبي")
                .with_label(1, "إيجابي"),
            Task::Article => Self::new()
                .with_label(0, "ثقافة")
                .with_label(1, "تنوع")
                .with_label(2, "اقتصاد")
                .with_label(3, "سياسة")
                .with_label(4, "رياضة"),
            Task::Dialect => Self::new()
                .with_label("Egyptian", "المصرية")
                .with_label("Gulf", "الخليجية")
                .with_label("Levantine", "بلاد الشام")
                .with_label("Maghrebi", "المغرب العربي")
                .with_label("Sudanese-Iraqi", "السودانية أو العراقية"),
        }
    }

    pub fn get(&self, key: &ClassKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ClassKey> {
        self.entries.keys()
    }

    /// Display strings in key order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys from `classes` that have no entry in this map.
    pub fn uncovered<'a>(&self, classes: impl IntoIterator<Item = &'a ClassKey>) -> Vec<ClassKey> {
        classes
            .into_iter()
            .filter(|key| !self.entries.contains_key(key))
            .cloned()
            .collect()
    }
}
