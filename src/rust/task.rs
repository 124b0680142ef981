use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three independent classification problems served by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Positive / negative polarity
    Sentiment,
    /// News article topic, five categories
    Article,
    /// Arabic dialect family, five families
    Dialect,
}

impl Task {
    /// All tasks in display order
    pub const ALL: [Task; 3] = [Task::Sentiment, Task::Article, Task::Dialect];

    /// Stable machine name, used in URLs and artifact directories
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Article => "article",
            Self::Dialect => "dialect",
        }
    }

    /// Arabic heading shown on the task page and on the home button
    pub fn title(&self) -> &'static str {
        match self {
            Self::Sentiment => "تصنيف الإحساس",
            Self::Article => "تصنيف المقالات",
            Self::Dialect => "تصنيف اللهجات",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task: {0}")]
pub struct UnknownTask(pub String);

impl FromStr for Task {
    type Err = UnknownTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiment" => Ok(Self::Sentiment),
            "article" => Ok(Self::Article),
            "dialect" => Ok(Self::Dialect),
            other => Err(UnknownTask(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for task in Task::ALL {
            assert_eq!(task.as_str().parse::<Task>().unwrap(), task);
        }
        assert_eq!(" Dialect ".parse::<Task>().unwrap(), Task::Dialect);
    }

    #[test]
    fn test_unknown_task() {
        let err = "weather".parse::<Task>().unwrap_err();
        assert_eq!(err, UnknownTask("weather".into()));
    }
}
