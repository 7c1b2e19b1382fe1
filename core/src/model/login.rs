use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CanvasField, CanvasModel, CanvasObject};

/// A login (pseudonym) attached to a user account.
///
/// The create endpoint mixes objects: `user[id]` next to `login[unique_id]`.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Login {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    pub account_id: Option<u64>,
    pub unique_id: Option<String>,
    pub sis_user_id: Option<String>,
    #[serde(skip_deserializing)]
    pub password: Option<String>,
}

impl CanvasModel for Login {
    const OBJECT: CanvasObject = CanvasObject::keyed("login");
    const FIELDS: &'static [CanvasField] = &[
        CanvasField::nested_under("user_id", "user", "id"),
        CanvasField::nested("unique_id", "unique_id"),
        CanvasField::nested("sis_user_id", "sis_user_id"),
        CanvasField::nested("password", "password"),
    ];
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("account_id", &self.account_id)
            .field("unique_id", &self.unique_id)
            .field("sis_user_id", &self.sis_user_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
