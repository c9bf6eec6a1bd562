use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned task identifier.
///
/// The API is free to hand out string or integer ids, so the wire
/// representation is kept as received and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl TaskId {
    pub fn is_empty(&self) -> bool {
        matches!(self, TaskId::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TaskId {
    /// Parse user input (CLI arguments): digits become numeric ids
    fn from(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => TaskId::Number(n),
            Err(_) => TaskId::Text(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<TaskId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    // Local wall-clock time, YYYY-MM-DDTHH:MM
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub time: String,
    #[serde(default)]
    pub completed: bool,
    /// Fields the server sends that this client does not model.
    /// Carried through so full-object updates don't drop them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    pub fn new(title: String, description: String, time: String) -> Self {
        Self {
            id: None,
            title,
            description,
            time,
            completed: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Status text shown in the table and CLI listing
    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "Completed"
        } else {
            "Not Completed"
        }
    }

    /// Full copy with `completed` inverted, everything else verbatim
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Empty strings and nulls both mean "not created yet"
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<TaskId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<TaskId>::deserialize(deserializer)?;
    Ok(id.filter(|id| !id.is_empty()))
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_and_string_ids() {
        let numeric: Task = serde_json::from_value(json!({
            "id": 7, "title": "a", "description": "b", "time": "2024-01-01T09:00", "completed": false
        }))
        .unwrap();
        assert_eq!(numeric.id, Some(TaskId::Number(7)));

        let text: Task = serde_json::from_value(json!({
            "id": "65a1f", "title": "a", "description": "b", "time": "2024-01-01T09:00"
        }))
        .unwrap();
        assert_eq!(text.id, Some(TaskId::Text("65a1f".to_string())));
        assert!(!text.completed);
    }

    #[test]
    fn empty_or_null_id_means_new() {
        let empty: Task = serde_json::from_value(json!({"id": "", "title": "a"})).unwrap();
        assert!(empty.is_new());
        let null: Task = serde_json::from_value(json!({"id": null, "title": "a"})).unwrap();
        assert!(null.is_new());
    }

    #[test]
    fn missing_or_null_time_becomes_empty() {
        let missing: Task = serde_json::from_value(json!({"id": 1, "title": "a"})).unwrap();
        assert_eq!(missing.time, "");
        let null: Task = serde_json::from_value(json!({"id": 1, "title": "a", "time": null})).unwrap();
        assert_eq!(null.time, "");
    }

    #[test]
    fn new_task_serializes_without_id() {
        let task = Task::new("Standup".into(), "daily".into(), "2024-01-01T09:00".into());
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["title"], "Standup");
        assert_eq!(value["completed"], false);
    }

    #[test]
    fn unknown_fields_survive_a_toggle() {
        let task: Task = serde_json::from_value(json!({
            "id": 3, "title": "a", "description": "b", "time": "2024-01-01T09:00",
            "completed": false, "priority": "high"
        }))
        .unwrap();
        let value = serde_json::to_value(task.toggled()).unwrap();
        assert_eq!(value["priority"], "high");
        assert_eq!(value["completed"], true);
        assert_eq!(value["time"], "2024-01-01T09:00");
        assert_eq!(value["id"], 3);
    }

    #[test]
    fn cli_ids_parse_digits_as_numbers() {
        assert_eq!(TaskId::from("42"), TaskId::Number(42));
        assert_eq!(TaskId::from("abc"), TaskId::Text("abc".into()));
        assert_eq!(TaskId::Text("x1".into()).to_string(), "x1");
    }
}
