//! Task records as exchanged with the remote API.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned task identifier. Never generated on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A task as returned by `GET /tasks` and `GET /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub course: String,
    pub description: String,
    pub lecturer: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_finished: bool,
    #[serde(with = "crate::date")]
    pub start_date: NaiveDate,
    #[serde(with = "crate::date")]
    pub end_date: NaiveDate,
}

/// Request body for creating or updating a task: every field except `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub course: String,
    pub description: String,
    pub lecturer: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_finished: bool,
    #[serde(with = "crate::date")]
    pub start_date: NaiveDate,
    #[serde(with = "crate::date")]
    pub end_date: NaiveDate,
}

impl Task {
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            course: self.course.clone(),
            description: self.description.clone(),
            lecturer: self.lecturer.clone(),
            is_finished: self.is_finished,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl TaskDraft {
    /// An empty draft whose date range is the single day `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            course: String::new(),
            description: String::new(),
            lecturer: String::new(),
            is_finished: false,
            start_date: today,
            end_date: today,
        }
    }

    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            name: self.name,
            course: self.course,
            description: self.description,
            lecturer: self.lecturer,
            is_finished: self.is_finished,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// The API reports `is_finished` as a boolean, as `0`/`1`, or as `"0"`/`"1"`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "invalid is_finished value: {other}"
        ))),
        Flag::Text(text) => match text.trim() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "invalid is_finished value: {other}"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json(is_finished: serde_json::Value) -> serde_json::Value {
        json!({
            "id": 7,
            "name": "Essay",
            "course": "Mobile Programming",
            "description": "Write the report",
            "lecturer": "Dr. Rahma",
            "is_finished": is_finished,
            "start_date": "2024-01-02",
            "end_date": "2024-01-09"
        })
    }

    #[test]
    fn test_is_finished_accepts_all_wire_shapes() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("0"), false),
        ] {
            let task: Task = serde_json::from_value(sample_json(raw.clone())).unwrap();
            assert_eq!(task.is_finished, expected, "wire value {raw}");
        }
    }

    #[test]
    fn test_is_finished_rejects_other_numbers() {
        let result: Result<Task, _> = serde_json::from_value(sample_json(json!(2)));
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_serializes_without_id_and_with_plain_dates() {
        let task: Task = serde_json::from_value(sample_json(json!(0))).unwrap();
        let body = serde_json::to_value(task.to_draft()).unwrap();

        assert!(body.get("id").is_none());
        assert_eq!(body["start_date"], "2024-01-02");
        assert_eq!(body["end_date"], "2024-01-09");
        assert_eq!(body["is_finished"], false);
    }

    #[test]
    fn test_task_accepts_timestamp_start_date() {
        let mut raw = sample_json(json!(1));
        raw["start_date"] = json!("2024-01-02T00:00:00.000000Z");
        let task: Task = serde_json::from_value(raw).unwrap();
        assert_eq!(task.start_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_into_task_keeps_fields() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut draft = TaskDraft::blank(today);
        draft.name = "Quiz".to_string();

        let task = draft.into_task(TaskId(3));
        assert_eq!(task.id, TaskId(3));
        assert_eq!(task.name, "Quiz");
        assert_eq!(task.start_date, today);
        assert_eq!(task.end_date, today);
    }
}
