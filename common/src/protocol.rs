use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Gameboard;

/// Body of every request sent to the game page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ActionRequest {
    #[serde(rename = "check_p2")]
    CheckP2,
    #[serde(rename = "get_status")]
    GetStatus {
        #[serde(with = "encoded_board")]
        gameboard: Gameboard,
    },
    #[serde(rename = "add_cell")]
    AddCell { cell_x: usize, cell_y: usize },
    #[serde(rename = "gen_move")]
    GenMove,
}

impl ActionRequest {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            ActionRequest::CheckP2 => "check_p2",
            ActionRequest::GetStatus { .. } => "get_status",
            ActionRequest::AddCell { .. } => "add_cell",
            ActionRequest::GenMove => "gen_move",
        }
    }
}

/// What the server expects this client to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Wait,
    AddCell,
    GameOver,
    /// Anything the client does not know how to handle
    #[serde(other)]
    Unknown,
}

impl NextAction {
    pub fn from_wire(action: &str) -> Self {
        match action {
            "wait" => NextAction::Wait,
            "add_cell" => NextAction::AddCell,
            "game_over" => NextAction::GameOver,
            _ => NextAction::Unknown,
        }
    }
}

/// Reply to any [`ActionRequest`]. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<NextAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p1_cells: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2_cells: Option<u32>,
    /// Pre-rendered board markup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gameboard: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts_class: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub send_gen_move: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub p2_ingame: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2_name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl ActionResponse {
    /// Board markup to render, treating an empty fragment as absent
    pub fn board_fragment(&self) -> Option<&str> {
        self.gameboard.as_deref().filter(|fragment| !fragment.is_empty())
    }

    /// Read a reply that is known to be JSON without rejecting loosely typed fields.
    ///
    /// Flags follow JSON truthiness (`1` and `"yes"` are set, `0`, `""` and `null`
    /// are not), numbers are accepted wherever text is shown, and a field of any
    /// other unexpected type reads as absent. A reply that is not an object reads
    /// as all fields absent.
    pub fn from_json(value: &Value) -> Self {
        Self {
            next_action: value["next_action"].as_str().map(NextAction::from_wire),
            status: text(&value["status"]),
            p1_cells: count(&value["p1_cells"]),
            p2_cells: count(&value["p2_cells"]),
            gameboard: value["gameboard"].as_str().map(str::to_string),
            error: truthy(&value["error"]),
            message: text(&value["message"]),
            cell_class: value["cell_class"].as_str().map(str::to_string),
            counts_class: value["counts_class"].as_str().map(str::to_string),
            send_gen_move: truthy(&value["send_gen_move"]),
            p2_ingame: truthy(&value["p2_ingame"]),
            p2_name: text(&value["p2_name"]),
            success: truthy(&value["success"]),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The server decodes `gameboard` a second time, so the matrix travels as a JSON string
mod encoded_board {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    use crate::models::Gameboard;

    pub fn serialize<S: Serializer>(board: &Gameboard, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = serde_json::to_string(board).map_err(ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Gameboard, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        serde_json::from_str(&encoded).map_err(de::Error::custom)
    }
}
