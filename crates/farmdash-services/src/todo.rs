//! To-do types.
//!
//! `cropId` is a weak reference: nothing checks that the crop exists and
//! deleting a crop leaves its todos alone.

use serde::{Deserialize, Deserializer, Serialize};

use crate::store::Resource;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub crop_id: Option<String>,
    /// Local date-time as entered in the browser (`2026-05-01T07:30`).
    pub when: Option<String>,
    pub done: bool,
}

/// Request to create a new todo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoCreateRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
}

/// Request to update an existing todo (partial update).
///
/// For `cropId` and `when`, an absent key keeps the current value while an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub crop_id: Option<Option<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub when: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

/// Marks a key as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Resource for Todo {
    type Draft = TodoCreateRequest;
    type Patch = TodoUpdateRequest;

    fn from_draft(id: String, draft: TodoCreateRequest) -> Self {
        Self {
            id,
            title: draft.title,
            crop_id: non_empty(draft.crop_id),
            when: non_empty(draft.when),
            done: false,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: TodoUpdateRequest) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(crop_id) = patch.crop_id {
            self.crop_id = crop_id;
        }
        if let Some(when) = patch.when {
            self.when = when;
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo::from_draft(
            "t1".into(),
            TodoCreateRequest {
                title: "Irrigate north field".into(),
                crop_id: Some("c1".into()),
                when: Some("2026-05-01T07:30".into()),
            },
        )
    }

    #[test]
    fn test_todo_serialization() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "t1",
                "title": "Irrigate north field",
                "cropId": "c1",
                "when": "2026-05-01T07:30",
                "done": false
            })
        );
    }

    #[test]
    fn test_create_defaults() {
        let req: TodoCreateRequest = serde_json::from_str("{}").unwrap();
        let todo = Todo::from_draft("t2".into(), req);
        assert_eq!(todo.title, "");
        assert_eq!(todo.crop_id, None);
        assert_eq!(todo.when, None);
        assert!(!todo.done);
    }

    #[test]
    fn test_create_blank_references_are_null() {
        let req: TodoCreateRequest =
            serde_json::from_str(r#"{"title":"Scout","cropId":"","when":""}"#).unwrap();
        let todo = Todo::from_draft("t3".into(), req);
        assert_eq!(todo.crop_id, None);
        assert_eq!(todo.when, None);
    }

    #[test]
    fn test_done_only_patch() {
        let mut todo = sample();
        let before = todo.clone();
        let patch: TodoUpdateRequest = serde_json::from_str(r#"{"done":true}"#).unwrap();
        todo.apply_patch(patch);

        assert!(todo.done);
        assert_eq!(todo.title, before.title);
        assert_eq!(todo.crop_id, before.crop_id);
        assert_eq!(todo.when, before.when);
    }

    #[test]
    fn test_explicit_null_clears_reference() {
        let mut todo = sample();
        let patch: TodoUpdateRequest = serde_json::from_str(r#"{"cropId":null}"#).unwrap();
        assert_eq!(patch.crop_id, Some(None));
        todo.apply_patch(patch);

        assert_eq!(todo.crop_id, None);
        assert_eq!(todo.when.as_deref(), Some("2026-05-01T07:30"));
    }

    #[test]
    fn test_update_ignores_id() {
        let mut todo = sample();
        let patch: TodoUpdateRequest =
            serde_json::from_str(r#"{"id":"other","title":"Renamed"}"#).unwrap();
        todo.apply_patch(patch);
        assert_eq!(todo.id, "t1");
        assert_eq!(todo.title, "Renamed");
    }

    #[test]
    fn test_update_request_partial() {
        let req = TodoUpdateRequest {
            done: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"done":true}"#);
    }
}
