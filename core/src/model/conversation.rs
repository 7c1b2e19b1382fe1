use serde::{Deserialize, Serialize};

use super::{CanvasField, CanvasModel, CanvasObject};

/// A new conversation (message thread).
///
/// The conversations endpoint takes flat parameters and has no JSON form,
/// so the type declares no object key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Option<u64>,
    pub subject: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub group_conversation: Option<bool>,
}

impl CanvasModel for Conversation {
    const OBJECT: CanvasObject = CanvasObject::unkeyed();
    const FIELDS: &'static [CanvasField] = &[
        CanvasField::flat("subject", "subject"),
        CanvasField::flat("body", "body"),
        CanvasField::flat("recipients", "recipients").list(),
        CanvasField::flat("group_conversation", "group_conversation"),
    ];
}
