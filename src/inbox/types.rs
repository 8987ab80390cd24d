//! Core types for human-in-the-loop review.
//!
//! The backend pauses a graph run with an interrupt whose value lists the
//! pending actions and, for each, which human decisions are legal. These
//! types model that payload, the working responses a reviewer edits, and
//! the decisions sent back to resume the run.

use crate::inbox::error::InboxError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A kind of human decision. Also used as the "submit type": which of the
/// working responses is currently selected for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Approve,
    Edit,
    Reject,
}

impl DecisionType {
    /// Order in which working responses are constructed for an action.
    pub const CONSTRUCTION_ORDER: [DecisionType; 3] =
        [DecisionType::Edit, DecisionType::Approve, DecisionType::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Approve => "approve",
            DecisionType::Edit => "edit",
            DecisionType::Reject => "reject",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = InboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "approve" => Ok(DecisionType::Approve),
            "edit" => Ok(DecisionType::Edit),
            "reject" => Ok(DecisionType::Reject),
            other => Err(InboxError::UnsupportedResponseType {
                found: other.to_string(),
            }),
        }
    }
}

/// One operation the backend proposes and wants reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Optional explanation attached by the backend. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which decisions are legal for a named action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub action_name: String,
    #[serde(default, deserialize_with = "lenient_decisions")]
    pub allowed_decisions: Vec<DecisionType>,
}

impl ReviewConfig {
    pub fn allows(&self, decision: DecisionType) -> bool {
        self.allowed_decisions.contains(&decision)
    }
}

/// Unknown decision names are dropped instead of failing the whole
/// interrupt, and repeats collapse so the list behaves as an ordered set.
fn lenient_decisions<'de, D>(deserializer: D) -> Result<Vec<DecisionType>, D::Error>
where
    D: Deserializer<'de>,
{
    // An explicit null counts as no allowed decisions
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut decisions = Vec::with_capacity(raw.len());
    for value in raw {
        let parsed = value.as_str().and_then(|s| s.parse::<DecisionType>().ok());
        match parsed {
            Some(decision) if !decisions.contains(&decision) => decisions.push(decision),
            Some(_) => {}
            None => tracing::debug!("ignoring unknown allowed decision: {}", value),
        }
    }
    Ok(decisions)
}

/// The interrupt value for tool-call review: parallel lists of pending
/// actions and their review policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitlRequest {
    #[serde(default)]
    pub action_requests: Vec<ActionRequest>,
    #[serde(default)]
    pub review_configs: Vec<ReviewConfig>,
}

impl HitlRequest {
    /// Validate an opaque interrupt value. Returns `None` unless the value
    /// has both lists present and non-empty.
    pub fn from_value(value: &Value) -> Option<HitlRequest> {
        let object = value.as_object()?;
        let has_list = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_array)
                .is_some_and(|list| !list.is_empty())
        };
        if !has_list("action_requests") || !has_list("review_configs") {
            return None;
        }
        match serde_json::from_value::<HitlRequest>(value.clone()) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::debug!("interrupt value is not a HITL request: {}", e);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.action_requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_requests.is_empty()
    }

    /// Review config for the action at `index`: the config whose
    /// `action_name` matches, else the config at the same position.
    pub fn review_config_for(&self, index: usize) -> Option<&ReviewConfig> {
        let action = self.action_requests.get(index)?;
        self.review_configs
            .iter()
            .find(|config| config.action_name == action.name)
            .or_else(|| self.review_configs.get(index))
    }

    /// Narrow the request to the single action at `index` paired with its
    /// review config.
    pub fn single_action(&self, index: usize) -> Option<HitlRequest> {
        let action = self.action_requests.get(index)?;
        let config = self.review_config_for(index)?;
        Some(HitlRequest {
            action_requests: vec![action.clone()],
            review_configs: vec![config.clone()],
        })
    }
}

/// A pause in graph execution, as delivered by the run stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl Interrupt {
    pub fn new(value: Value) -> Self {
        Self { id: None, value }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The HITL request carried by this interrupt, if its value has the
    /// expected shape.
    pub fn hitl_request(&self) -> Option<HitlRequest> {
        HitlRequest::from_value(&self.value)
    }
}

/// An action as the reviewer edited it. All arg values are strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedAction {
    pub name: String,
    pub args: IndexMap<String, String>,
}

/// Working state for one response mode of the action under review.
/// At most one entry per variant exists for a given action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionWithEdits {
    Approve,
    Reject {
        message: String,
    },
    Edit {
        edited_action: EditedAction,
        /// Approve is also legal, so an untouched edit submits as approve.
        #[serde(rename = "acceptAllowed")]
        accept_allowed: bool,
        #[serde(rename = "editsMade")]
        edits_made: bool,
    },
}

impl DecisionWithEdits {
    pub fn decision_type(&self) -> DecisionType {
        match self {
            DecisionWithEdits::Approve => DecisionType::Approve,
            DecisionWithEdits::Reject { .. } => DecisionType::Reject,
            DecisionWithEdits::Edit { .. } => DecisionType::Edit,
        }
    }
}

/// A finalized decision in the shape the backend resumes with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject { message: String },
    Edit { edited_action: EditedAction },
}

impl Decision {
    pub fn reject(message: impl Into<String>) -> Self {
        Decision::Reject {
            message: message.into(),
        }
    }

    pub fn decision_type(&self) -> DecisionType {
        match self {
            Decision::Approve => DecisionType::Approve,
            Decision::Reject { .. } => DecisionType::Reject,
            Decision::Edit { .. } => DecisionType::Edit,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Reject { message } if message.is_empty() => write!(f, "reject"),
            Decision::Reject { message } => write!(f, "reject: {}", message),
            Decision::Edit { edited_action } => write!(
                f,
                "edit {} ({} args)",
                edited_action.name,
                edited_action.args.len()
            ),
        }
    }
}

/// Render an action arg as the string shown in (and sent from) the edit
/// form. Strings pass through, numbers print like JavaScript would, and
/// everything else becomes compact JSON.
pub fn stringify_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(js_number).unwrap_or_else(|| n.to_string())
            }
        }
        other => other.to_string(),
    }
}

/// Format a float the way JavaScript's `Number#toString` does: plain
/// decimal for exponents in `-7..21`, otherwise `d.ddde+N` notation.
fn js_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.5e-7"
    let sci = format!("{:e}", value.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let n = exponent + 1;
    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    };

    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Stringify every arg, keeping the backend's key order.
pub fn stringify_args(args: &Map<String, Value>) -> IndexMap<String, String> {
    args.iter()
        .map(|(key, value)| (key.clone(), stringify_arg(value)))
        .collect()
}
