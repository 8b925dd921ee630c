//! Recognition results shown next to the drawing.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expression label of the synthetic result produced on failure.
pub const FAILURE_EXPRESSION: &str = "Error";
/// Answer of the synthetic result produced on failure.
pub const FAILURE_ANSWER: &str = "Failed to process input";

/// What the recognition service decided the sketch was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Math,
    Shape,
    Graph,
    Drawing,
    /// Failures, and any category this client does not know.
    #[serde(other)]
    Error,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Math => "math",
            ResultKind::Shape => "shape",
            ResultKind::Graph => "graph",
            ResultKind::Drawing => "drawing",
            ResultKind::Error => "error",
        }
    }
}

/// One recognized item, ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// What was recognized (e.g. `2+2`, `Circle(radius=5)`).
    pub expression: String,
    /// The computed answer or description.
    pub answer: String,
    pub kind: ResultKind,
    /// Canvas point the result is shown next to.
    pub anchor: Option<Point>,
    /// Purpose of each color the user drew with, keyed by color name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_usage: Option<BTreeMap<String, String>>,
}

impl RecognitionResult {
    pub fn new(expression: impl Into<String>, answer: impl Into<String>, kind: ResultKind) -> Self {
        Self {
            expression: expression.into(),
            answer: answer.into(),
            kind,
            anchor: None,
            color_usage: None,
        }
    }

    /// The result substituted when the service cannot be reached.
    pub fn failure() -> Self {
        Self::new(FAILURE_EXPRESSION, FAILURE_ANSWER, ResultKind::Error)
    }

    pub fn with_anchor(mut self, anchor: Option<Point>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == ResultKind::Error
    }

    /// Single-line text for display and width estimation.
    pub fn label(&self) -> String {
        match self.kind {
            ResultKind::Math => format!("{} = {}", self.expression, self.answer),
            _ => format!("{}: {}", self.expression, self.answer),
        }
    }
}
