//! Wire types for the recognition service.
//!
//! ```json
//! { "image": "data:image/jpeg;base64,...", "dict_of_vars": { "x": "5" } }
//! { "status": "success", "message": "Image processed",
//!   "data": [{ "expr": "2+2", "result": "4", "type": "math", "assign": false }] }
//! ```

use kurbo::Point;
use serde::{Deserialize, Serialize};
use sketchcalc_core::results::{RecognitionResult, ResultKind};
use std::collections::BTreeMap;

/// Status value of a response whose `data` should be shown.
pub const STATUS_SUCCESS: &str = "success";

/// Variables bound by earlier submissions, keyed by name.
pub type Variables = BTreeMap<String, String>;

/// Body of `POST /calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// JPEG data URL of the canvas.
    pub image: String,
    pub dict_of_vars: Variables,
}

/// Body returned by `POST /calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub status: String,
    #[serde(default)]
    pub data: Vec<ResponseItem>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseItem {
    pub expr: String,
    pub result: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    /// Whether `expr` names a variable that now holds `result`.
    #[serde(default)]
    pub assign: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_usage: Option<BTreeMap<String, String>>,
}

impl ResponseItem {
    /// Convert into a displayable result anchored at `anchor`.
    pub fn into_result(self, anchor: Option<Point>) -> RecognitionResult {
        RecognitionResult {
            expression: self.expr,
            answer: self.result,
            kind: self.kind,
            anchor,
            color_usage: self.color_usage,
        }
    }
}

impl CalculateResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Record every `assign` item into `vars`.
    pub fn bind_variables(&self, vars: &mut Variables) {
        for item in self.data.iter().filter(|item| item.assign) {
            log::debug!("Binding variable {} = {}", item.expr, item.result);
            vars.insert(item.expr.clone(), item.result.clone());
        }
    }

    /// Results to display: all items on success, none otherwise.
    pub fn into_results(self, anchor: Option<Point>) -> Vec<RecognitionResult> {
        if !self.is_success() {
            return Vec::new();
        }
        self.data
            .into_iter()
            .map(|item| item.into_result(anchor))
            .collect()
    }
}
