use serde::Serialize;

use crate::domain::UserId;
use crate::entities::users;

/// Account data handed out of the repository (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub nickname: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<users::Model> for Account {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            email: model.email,
            nickname: model.nickname,
            is_admin: model.is_admin,
            created_at: model.created_at,
        }
    }
}
