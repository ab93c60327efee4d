use super::{SeaOrmStorage, settle};
use crate::entity::messages::{ActiveModel, Column, Entity as Messages, Relation};
use crate::entity::users::Column as UserColumn;
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome, messages::entities::ChatMessage, users::entities::UserRole,
};
use crate::utils::validate::validate_message;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use tracing::{info, warn};

// id, section_id, user_id, username, role, content, timestamp
type MessageRow = (i64, i64, i64, String, String, String, i64);

impl SeaOrmStorage {
    /// 发送班级聊天消息
    pub async fn save_message_impl(
        &self,
        section_id: i64,
        user_id: i64,
        content: &str,
    ) -> WriteOutcome {
        let content = match validate_message(content) {
            Ok(content) => content,
            Err(msg) => return WriteOutcome::Invalid(msg.to_string()),
        };
        settle(
            "发送消息",
            self.try_save_message(section_id, user_id, content).await,
        )
    }

    async fn try_save_message(
        &self,
        section_id: i64,
        user_id: i64,
        content: &str,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        if !self.section_exists(section_id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        let model = ActiveModel {
            section_id: Set(section_id),
            user_id: Set(user_id),
            content: Set(content.to_string()),
            timestamp: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("用户 {} 在班级 {} 发送消息", user_id, section_id);
        Ok(WriteOutcome::Created(model.id))
    }

    /// 班级聊天记录（带发送者用户名与角色），旧消息在前
    pub async fn list_section_messages_impl(&self, section_id: i64) -> Result<Vec<ChatMessage>> {
        let rows = Messages::find()
            .select_only()
            .column(Column::Id)
            .column(Column::SectionId)
            .column(Column::UserId)
            .column(UserColumn::Username)
            .column(UserColumn::Role)
            .column(Column::Content)
            .column(Column::Timestamp)
            .join(JoinType::InnerJoin, Relation::User.def())
            .filter(Column::SectionId.eq(section_id))
            .order_by_asc(Column::Timestamp)
            .order_by_asc(Column::Id)
            .into_tuple::<MessageRow>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询聊天记录失败: {e}")))?;

        rows.into_iter()
            .map(
                |(id, section_id, user_id, username, role, content, timestamp)| {
                    let role = role.parse::<UserRole>().map_err(|e| {
                        PortalError::database_operation(format!("用户角色无效: {e}"))
                    })?;
                    Ok(ChatMessage {
                        id,
                        section_id,
                        user_id,
                        username,
                        role,
                        content,
                        timestamp: DateTime::<Utc>::from_timestamp(timestamp, 0)
                            .unwrap_or_default(),
                    })
                },
            )
            .collect()
    }

    /// 删除消息
    ///
    /// 本人的消息总可以删除；教师可以删除其任教班级中的任何消息；管理员不受限制。
    pub async fn delete_message_impl(
        &self,
        message_id: i64,
        actor_id: i64,
        actor_role: UserRole,
    ) -> WriteOutcome {
        settle(
            "删除消息",
            self.try_delete_message(message_id, actor_id, actor_role)
                .await,
        )
    }

    async fn try_delete_message(
        &self,
        message_id: i64,
        actor_id: i64,
        actor_role: UserRole,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(message) = Messages::find_by_id(message_id).one(&self.db).await? else {
            return Ok(WriteOutcome::NotFound);
        };

        let allowed = message.user_id == actor_id
            || match actor_role {
                UserRole::Admin => true,
                UserRole::Teacher => self.teaches_section(actor_id, message.section_id).await?,
                UserRole::Student => false,
            };
        if !allowed {
            warn!("用户 {} 无权删除消息 {}", actor_id, message_id);
            return Ok(WriteOutcome::Forbidden);
        }

        Messages::delete_by_id(message_id).exec(&self.db).await?;
        info!("删除消息: {}", message_id);
        Ok(WriteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;

    #[tokio::test]
    async fn test_messages_oldest_first_with_sender() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let student = user(&storage, "stu", UserRole::Student).await;

        storage.save_message_impl(a, teacher, "  Welcome  ").await;
        storage.save_message_impl(a, student, "Hi").await;

        let messages = storage.list_section_messages_impl(a).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Welcome");
        assert_eq!(messages[0].role, UserRole::Teacher);
        assert_eq!(messages[1].username, "stu");
        assert_eq!(messages[1].role, UserRole::Student);
    }

    #[tokio::test]
    async fn test_save_message_validation() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;

        assert!(matches!(
            storage.save_message_impl(a, student, "   ").await,
            WriteOutcome::Invalid(_)
        ));
        assert_eq!(
            storage.save_message_impl(404, student, "hello").await,
            WriteOutcome::NotFound
        );
    }

    async fn post(storage: &SeaOrmStorage, section_id: i64, author: i64, text: &str) -> i64 {
        storage
            .save_message_impl(section_id, author, text)
            .await
            .created_id()
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_message_permissions() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let outsider = user(&storage, "outsider", UserRole::Teacher).await;
        let author = user(&storage, "author", UserRole::Student).await;
        let peer = user(&storage, "peer", UserRole::Student).await;
        let admin = user(&storage, "root", UserRole::Admin).await;
        storage
            .assign_to_section_impl(teacher, UserRole::Teacher, a)
            .await;

        let first = post(&storage, a, author, "one").await;
        assert_eq!(
            storage.delete_message_impl(first, peer, UserRole::Student).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            storage.delete_message_impl(first, outsider, UserRole::Teacher).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            storage.delete_message_impl(first, author, UserRole::Student).await,
            WriteOutcome::Deleted
        );

        let second = post(&storage, a, author, "two").await;
        assert_eq!(
            storage.delete_message_impl(second, teacher, UserRole::Teacher).await,
            WriteOutcome::Deleted
        );

        let third = post(&storage, a, author, "three").await;
        assert_eq!(
            storage.delete_message_impl(third, admin, UserRole::Admin).await,
            WriteOutcome::Deleted
        );
        assert_eq!(
            storage.delete_message_impl(third, admin, UserRole::Admin).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_author_deleted_cascades_messages() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;
        storage.save_message_impl(a, student, "bye").await;

        storage.delete_user_impl(student).await;
        assert!(storage.list_section_messages_impl(a).await.unwrap().is_empty());
    }
}
