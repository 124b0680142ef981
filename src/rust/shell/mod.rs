//! Presentation shell: the per-session view state machine and its HTTP front-end.
//!
//! The view is an explicit value: each request carries the current [`View`]
//! and each [`Outcome`] carries the next one. The server keeps no per-user
//! state, so any number of sessions can share one [`TaskRegistry`].

mod render;
mod server;

use std::fmt;
use std::str::FromStr;

use log::{debug, error};

pub use render::render_page;
pub use server::{build_router, serve, AppState};

use crate::labels::ClassKey;
use crate::pipeline::{PipelineError, PipelineInfo, Prediction};
use crate::registry::TaskRegistry;
use crate::Task;

/// Which page a session is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Sentiment,
    Article,
    Dialect,
}

impl View {
    pub fn task(&self) -> Option<Task> {
        match self {
            Self::Home => None,
            Self::Sentiment => Some(Task::Sentiment),
            Self::Article => Some(Task::Article),
            Self::Dialect => Some(Task::Dialect),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self.task() {
            Some(task) => task.as_str(),
            None => "home",
        }
    }
}

impl From<Task> for View {
    fn from(task: Task) -> Self {
        match task {
            Task::Sentiment => Self::Sentiment,
            Task::Article => Self::Article,
            Task::Dialect => Self::Dialect,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "home" => Ok(Self::Home),
            other => other.parse::<Task>().map(Self::from).map_err(|e| e.to_string()),
        }
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open a task page from the home page
    Select(Task),
    /// Return to the home page
    Back,
    /// Classify the given text on the current task page
    Submit(String),
}

impl Action {
    /// Decodes a form button value (`select:<task>`, `back`, `submit`)
    pub fn from_form(action: &str, text: Option<String>) -> Result<Self, String> {
        match action {
            "back" => Ok(Self::Back),
            "submit" => Ok(Self::Submit(text.unwrap_or_default())),
            other => match other.strip_prefix("select:") {
                Some(task) => task.parse().map(Self::Select).map_err(|e| e.to_string()),
                None => Err(format!("Unknown action: {}", other)),
            },
        }
    }
}

/// The result card shown after a successful prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub title: &'static str,
    pub message: String,
    /// CSS colour of the card's accent border
    pub color: &'static str,
    pub prediction: Prediction,
}

/// What the page shows under the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Nothing,
    Warning(&'static str),
    Result(ResultCard),
    Error(String),
}

/// The next view plus what to show in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub view: View,
    pub panel: Panel,
    /// Text to put back in the input box
    pub text: String,
}

/// Something that can classify text for a task.
pub trait Predictor: Send + Sync {
    fn predict(&self, task: Task, text: &str) -> Result<Prediction, PipelineError>;

    /// Configuration of the model behind `task`, when there is one to report
    fn info(&self, _task: Task) -> Option<PipelineInfo> {
        None
    }
}

impl Predictor for TaskRegistry {
    fn predict(&self, task: Task, text: &str) -> Result<Prediction, PipelineError> {
        self.get(task).predict_detailed(text)
    }

    fn info(&self, task: Task) -> Option<PipelineInfo> {
        Some(self.get(task).info())
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, task: Task, text: &str) -> Result<Prediction, PipelineError> {
        (**self).predict(task, text)
    }

    fn info(&self, task: Task) -> Option<PipelineInfo> {
        (**self).info(task)
    }
}

/// Warning shown when the input box is blank
pub fn empty_input_warning(task: Task) -> &'static str {
    match task {
        Task::Sentiment => "يرجى إدخال نص",
        Task::Article => "يرجى إدخال نص المقال",
        Task::Dialect => "يرجى إدخال نص باللهجة",
    }
}

fn result_title(task: Task) -> &'static str {
    match task {
        Task::Sentiment => "نتيجة الإحساس",
        Task::Article => "نتيجة المقال",
        Task::Dialect => "نتيجة اللهجة",
    }
}

fn result_color(prediction: &Prediction, task: Task) -> &'static str {
    match task {
        Task::Sentiment if prediction.class == ClassKey::Index(1) => "#4caf50",
        Task::Sentiment => "#f44336",
        Task::Article => "#2196f3",
        Task::Dialect => "#ff9800",
    }
}

/// Builds the result card for a prediction
pub fn result_card(task: Task, prediction: Prediction) -> ResultCard {
    ResultCard {
        title: result_title(task),
        message: format!("النص مصنف على أنه: {}", prediction.label),
        color: result_color(&prediction, task),
        prediction,
    }
}

/// True when `text` has nothing worth classifying
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Runs the view state machine over a [`Predictor`].
pub struct Shell<P> {
    predictor: P,
}

impl<P: Predictor> Shell<P> {
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Applies one action to the current view.
    ///
    /// Blank input never reaches the predictor: the view stays put and a
    /// task-specific warning is returned instead.
    pub fn handle(&self, view: View, action: Action) -> Outcome {
        match (view.task(), action) {
            (None, Action::Select(task)) => Self::show(View::from(task), Panel::Nothing, String::new()),
            (_, Action::Back) => Self::show(View::Home, Panel::Nothing, String::new()),
            (Some(task), Action::Submit(text)) => {
                if is_blank(&text) {
                    return Self::show(view, Panel::Warning(empty_input_warning(task)), text);
                }
                let panel = match self.predictor.predict(task, &text) {
                    Ok(prediction) => Panel::Result(result_card(task, prediction)),
                    Err(e) => {
                        error!("[{}] Prediction failed: {}", task, e);
                        Panel::Error(e.to_string())
                    }
                };
                Self::show(view, panel, text)
            }
            (_, action) => {
                debug!("Ignoring {:?} in the {} view", action, view);
                Self::show(view, Panel::Nothing, String::new())
            }
        }
    }

    fn show(view: View, panel: Panel, text: String) -> Outcome {
        Outcome { view, panel, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Labels every text with the task's first class and counts calls
    #[derive(Default)]
    struct CountingPredictor {
        calls: AtomicUsize,
    }

    impl Predictor for CountingPredictor {
        fn predict(&self, task: Task, _text: &str) -> Result<Prediction, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let labels = LabelMap::builtin(task);
            let class = labels.keys().next().cloned().unwrap_or(ClassKey::Index(0));
            let label = labels.get(&class).unwrap_or_default().to_string();
            Ok(Prediction { class, label })
        }
    }

    /// Emits a class no label map knows
    struct UnlabelledPredictor;

    impl Predictor for UnlabelledPredictor {
        fn predict(&self, task: Task, _text: &str) -> Result<Prediction, PipelineError> {
            Err(PipelineError::UnknownClass {
                task,
                class: ClassKey::Index(99),
            })
        }
    }

    fn shell() -> Shell<CountingPredictor> {
        Shell::new(CountingPredictor::default())
    }

    fn calls(shell: &Shell<CountingPredictor>) -> usize {
        shell.predictor().calls.load(Ordering::SeqCst)
    }

    #[test]
    fn test_navigation() {
        let shell = shell();
        let outcome = shell.handle(View::Home, Action::Select(Task::Article));
        assert_eq!(outcome.view, View::Article);
        assert_eq!(outcome.panel, Panel::Nothing);

        let outcome = shell.handle(View::Article, Action::Back);
        assert_eq!(outcome.view, View::Home);

        // Selecting from a task page is not a transition.
        let outcome = shell.handle(View::Dialect, Action::Select(Task::Sentiment));
        assert_eq!(outcome.view, View::Dialect);
        // Submitting from home does nothing.
        let outcome = shell.handle(View::Home, Action::Submit("نص".into()));
        assert_eq!(outcome.view, View::Home);
        assert_eq!(calls(&shell), 0);
    }

    #[test]
    fn test_blank_input_short_circuits() {
        let shell = shell();
        for text in ["", "   ", "\n\t "] {
            let outcome = shell.handle(View::Dialect, Action::Submit(text.into()));
            assert_eq!(outcome.view, View::Dialect);
            assert_eq!(outcome.panel, Panel::Warning("يرجى إدخال نص باللهجة"));
        }
        assert_eq!(calls(&shell), 0);
    }

    #[test]
    fn test_submit_shows_result() {
        let shell = shell();
        let outcome = shell.handle(View::Sentiment, Action::Submit("رائع جدا".into()));
        assert_eq!(outcome.view, View::Sentiment);
        assert_eq!(outcome.text, "رائع جدا");
        match outcome.panel {
            Panel::Result(card) => {
                assert_eq!(card.title, "نتيجة الإحساس");
                assert_eq!(card.message, "النص مصنف على أنه: سلبي");
                assert_eq!(card.color, "#f44336");
            }
            other => panic!("expected a result card, got {:?}", other),
        }
        assert_eq!(calls(&shell), 1);
    }

    #[test]
    fn test_unlabelled_class_shows_error() {
        let shell = Shell::new(UnlabelledPredictor);
        let outcome = shell.handle(View::Article, Action::Submit("نص المقال".into()));
        assert_eq!(outcome.view, View::Article);
        assert_eq!(outcome.text, "نص المقال");
        match outcome.panel {
            Panel::Error(message) => assert!(message.contains("99")),
            other => panic!("expected an error panel, got {:?}", other),
        }
    }

    #[test]
    fn test_result_colors() {
        let positive = Prediction {
            class: ClassKey::Index(1),
            label: "إيجابي".into(),
        };
        assert_eq!(result_card(Task::Sentiment, positive.clone()).color, "#4caf50");
        assert_eq!(result_card(Task::Article, positive.clone()).color, "#2196f3");
        assert_eq!(result_card(Task::Dialect, positive).color, "#ff9800");
    }

    #[test]
    fn test_parse_form_values() {
        assert_eq!("home".parse::<View>().unwrap(), View::Home);
        assert_eq!("article".parse::<View>().unwrap(), View::Article);
        assert!("settings".parse::<View>().is_err());

        assert_eq!(Action::from_form("back", None).unwrap(), Action::Back);
        assert_eq!(
            Action::from_form("select:dialect", None).unwrap(),
            Action::Select(Task::Dialect)
        );
        assert_eq!(Action::from_form("submit", None).unwrap(), Action::Submit(String::new()));
        assert!(Action::from_form("select:weather", None).is_err());
        assert!(Action::from_form("delete", None).is_err());
    }
}
