use crate::error::PostError;
use crate::models::{NotificationArgs, NotificationKind};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub args: Json, // JSONB field
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for crate::models::Notification {
    type Error = PostError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let args: NotificationArgs = serde_json::from_value(model.args).map_err(|e| {
            PostError::Internal(format!("Malformed args on notification {}: {}", model.id, e))
        })?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            kind: model.kind,
            args,
            created_at: model.created_at.into(),
        })
    }
}

impl TryFrom<crate::models::Notification> for ActiveModel {
    type Error = PostError;

    fn try_from(notification: crate::models::Notification) -> Result<Self, Self::Error> {
        let args = serde_json::to_value(notification.args)
            .map_err(|e| PostError::Internal(format!("Failed to serialize args: {}", e)))?;

        Ok(ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            kind: Set(notification.kind),
            args: Set(args),
            created_at: Set(notification.created_at.into()),
        })
    }
}
