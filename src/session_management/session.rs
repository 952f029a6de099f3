use serde::{Deserialize, Serialize};

/// An authenticated identity.
///
/// The serialized form doubles as the session token stored in the session
/// partition, so field names follow the camelCase JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn new<S: Into<String>>(id: S, name: S, email: S) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            is_admin: false,
        }
    }
}
