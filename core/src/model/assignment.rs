use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CanvasField, CanvasModel, CanvasObject};

/// A course assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Option<u64>,
    pub course_id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub points_possible: Option<f64>,
    pub due_at: Option<DateTime<Utc>>,
    pub lock_at: Option<DateTime<Utc>>,
    pub unlock_at: Option<DateTime<Utc>>,
    pub grading_type: Option<String>,
    pub submission_types: Option<Vec<String>>,
    pub published: Option<bool>,
    pub position: Option<u32>,
}

impl CanvasModel for Assignment {
    const OBJECT: CanvasObject = CanvasObject::keyed("assignment");
    const FIELDS: &'static [CanvasField] = &[
        CanvasField::nested("name", "name"),
        CanvasField::nested("description", "description"),
        CanvasField::nested("points_possible", "points_possible"),
        CanvasField::nested("due_at", "due_at"),
        CanvasField::nested("lock_at", "lock_at"),
        CanvasField::nested("unlock_at", "unlock_at"),
        CanvasField::nested("grading_type", "grading_type"),
        CanvasField::nested("submission_types", "submission_types").list(),
        CanvasField::nested("published", "published"),
        CanvasField::nested("position", "position"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn json_object_matches_create_endpoint_shape() {
        let assignment = Assignment {
            name: Some("Assignment 1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            assignment.to_json_object().unwrap(),
            json!({"assignment": {"name": "Assignment 1"}})
        );
    }

    #[test]
    fn post_map_nests_fields_under_assignment() {
        let assignment = Assignment {
            name: Some("Essay".to_string()),
            points_possible: Some(10.0),
            due_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 0).unwrap()),
            submission_types: Some(vec!["online_text_entry".to_string()]),
            ..Default::default()
        };
        let map = assignment.to_post_map().unwrap();
        assert_eq!(map["assignment[name]"], json!("Essay"));
        assert_eq!(map["assignment[points_possible]"], json!(10.0));
        assert_eq!(map["assignment[due_at]"], json!("2026-03-01T23:59:00Z"));
        assert_eq!(
            map["assignment[submission_types][]"],
            json!(["online_text_entry"])
        );
        assert!(!map.contains_key("id"));
        assert!(!map.keys().any(|k| k.contains("course_id")));
    }

    #[test]
    fn deserializes_canvas_payload() {
        let assignment: Assignment = serde_json::from_value(json!({
            "id": 7,
            "course_id": 3,
            "name": "Quiz 1",
            "points_possible": 5,
            "due_at": "2026-01-10T12:00:00Z",
            "published": true,
            "html_url": "https://canvas.example.edu/courses/3/assignments/7"
        }))
        .unwrap();
        assert_eq!(assignment.id, Some(7));
        assert_eq!(assignment.points_possible, Some(5.0));
        assert_eq!(assignment.published, Some(true));
        assert!(assignment.due_at.is_some());
    }
}
