use super::{SeaOrmStorage, settle};
use crate::entity::recommendation_topics::{
    self, ActiveModel as TopicActiveModel, Entity as Topics,
};
use crate::entity::users::Column as UserColumn;
use crate::entity::video_recommendations::{
    self, ActiveModel as RecommendationActiveModel, Entity as VideoRecommendations,
};
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome,
    recommendations::entities::{Topic, VideoRecommendation},
};
use crate::utils::validate::{validate_name, validate_video_url};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::{info, warn};

// id, topic_name, section_id, created_by, created_at, creator_name
type TopicRow = (i64, String, i64, Option<i64>, i64, Option<String>);

// id, topic_id, video_url, title, added_by, added_at, adder_name
type RecommendationRow = (i64, i64, String, Option<String>, i64, i64, String);

fn timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

fn into_topic(row: TopicRow) -> Topic {
    let (id, topic_name, section_id, created_by, created_at, creator_name) = row;
    Topic {
        id,
        topic_name,
        section_id,
        created_by,
        creator_name,
        created_at: timestamp(created_at),
    }
}

impl SeaOrmStorage {
    /// 创建推荐主题，同一班级内主题名唯一
    pub async fn create_topic_impl(
        &self,
        topic_name: &str,
        section_id: i64,
        created_by: i64,
    ) -> WriteOutcome {
        let name = match validate_name("Topic name", topic_name) {
            Ok(name) => name,
            Err(msg) => return WriteOutcome::Invalid(msg),
        };
        settle(
            "创建推荐主题",
            self.try_create_topic(name, section_id, created_by).await,
        )
    }

    async fn try_create_topic(
        &self,
        name: &str,
        section_id: i64,
        created_by: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        if !self.section_exists(section_id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        let model = TopicActiveModel {
            topic_name: Set(name.to_string()),
            section_id: Set(section_id),
            created_by: Set(Some(created_by)),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("创建推荐主题: {} (班级 {})", model.topic_name, section_id);
        Ok(WriteOutcome::Created(model.id))
    }

    /// 查询主题（左连接创建者，创建者被删除后用户名为空）
    async fn query_topics(&self, condition: Condition) -> Result<Vec<Topic>> {
        let rows = Topics::find()
            .select_only()
            .columns([
                recommendation_topics::Column::Id,
                recommendation_topics::Column::TopicName,
                recommendation_topics::Column::SectionId,
                recommendation_topics::Column::CreatedBy,
                recommendation_topics::Column::CreatedAt,
            ])
            .column(UserColumn::Username)
            .join(
                JoinType::LeftJoin,
                recommendation_topics::Relation::Creator.def(),
            )
            .filter(condition)
            .order_by_asc(recommendation_topics::Column::TopicName)
            .into_tuple::<TopicRow>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询推荐主题失败: {e}")))?;

        Ok(rows.into_iter().map(into_topic).collect())
    }

    pub async fn get_topic_impl(&self, topic_id: i64) -> Result<Option<Topic>> {
        let topics = self
            .query_topics(Condition::all().add(recommendation_topics::Column::Id.eq(topic_id)))
            .await?;
        Ok(topics.into_iter().next())
    }

    /// 班级中的推荐主题，按名称排序
    pub async fn list_section_topics_impl(&self, section_id: i64) -> Result<Vec<Topic>> {
        self.query_topics(
            Condition::all().add(recommendation_topics::Column::SectionId.eq(section_id)),
        )
        .await
    }

    /// 删除主题，只有创建者可以删除（级联删除主题下的推荐）
    pub async fn delete_topic_impl(&self, topic_id: i64, actor_id: i64) -> WriteOutcome {
        settle("删除推荐主题", self.try_delete_topic(topic_id, actor_id).await)
    }

    async fn try_delete_topic(
        &self,
        topic_id: i64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(topic) = Topics::find_by_id(topic_id).one(&self.db).await? else {
            return Ok(WriteOutcome::NotFound);
        };
        if topic.created_by != Some(actor_id) {
            warn!("用户 {} 尝试删除非本人创建的主题 {}", actor_id, topic_id);
            return Ok(WriteOutcome::Forbidden);
        }

        Topics::delete_by_id(topic_id).exec(&self.db).await?;
        info!("删除推荐主题: {}", topic.topic_name);
        Ok(WriteOutcome::Deleted)
    }

    /// 在主题下推荐视频
    pub async fn add_video_recommendation_impl(
        &self,
        topic_id: i64,
        video_url: &str,
        added_by: i64,
        title: Option<&str>,
    ) -> WriteOutcome {
        let video_url = match validate_video_url(video_url) {
            Ok(url) => url,
            Err(msg) => return WriteOutcome::Invalid(msg.to_string()),
        };
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        settle(
            "添加视频推荐",
            self.try_add_video_recommendation(topic_id, video_url, added_by, title)
                .await,
        )
    }

    async fn try_add_video_recommendation(
        &self,
        topic_id: i64,
        video_url: &str,
        added_by: i64,
        title: Option<String>,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        if Topics::find_by_id(topic_id).one(&self.db).await?.is_none() {
            return Ok(WriteOutcome::NotFound);
        }

        let model = RecommendationActiveModel {
            topic_id: Set(topic_id),
            video_url: Set(video_url.to_string()),
            title: Set(title),
            added_by: Set(added_by),
            added_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("用户 {} 在主题 {} 下推荐视频", added_by, topic_id);
        Ok(WriteOutcome::Created(model.id))
    }

    /// 主题下的视频推荐（带推荐者用户名），按推荐时间排序
    pub async fn list_topic_recommendations_impl(
        &self,
        topic_id: i64,
    ) -> Result<Vec<VideoRecommendation>> {
        let rows = VideoRecommendations::find()
            .select_only()
            .columns([
                video_recommendations::Column::Id,
                video_recommendations::Column::TopicId,
                video_recommendations::Column::VideoUrl,
                video_recommendations::Column::Title,
                video_recommendations::Column::AddedBy,
                video_recommendations::Column::AddedAt,
            ])
            .column(UserColumn::Username)
            .join(
                JoinType::InnerJoin,
                video_recommendations::Relation::Adder.def(),
            )
            .filter(video_recommendations::Column::TopicId.eq(topic_id))
            .order_by_asc(video_recommendations::Column::AddedAt)
            .order_by_asc(video_recommendations::Column::Id)
            .into_tuple::<RecommendationRow>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询视频推荐失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, topic_id, video_url, title, added_by, added_at, adder_name)| {
                    VideoRecommendation {
                        id,
                        topic_id,
                        video_url,
                        title,
                        added_by,
                        adder_name,
                        added_at: timestamp(added_at),
                    }
                },
            )
            .collect())
    }

    /// 删除视频推荐，只有推荐者可以删除
    pub async fn delete_video_recommendation_impl(
        &self,
        recommendation_id: i64,
        actor_id: i64,
    ) -> WriteOutcome {
        settle(
            "删除视频推荐",
            self.try_delete_video_recommendation(recommendation_id, actor_id)
                .await,
        )
    }

    async fn try_delete_video_recommendation(
        &self,
        recommendation_id: i64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(recommendation) = VideoRecommendations::find_by_id(recommendation_id)
            .one(&self.db)
            .await?
        else {
            return Ok(WriteOutcome::NotFound);
        };
        if recommendation.added_by != actor_id {
            warn!(
                "用户 {} 尝试删除非本人添加的视频推荐 {}",
                actor_id, recommendation_id
            );
            return Ok(WriteOutcome::Forbidden);
        }

        VideoRecommendations::delete_by_id(recommendation_id)
            .exec(&self.db)
            .await?;
        info!("删除视频推荐: {}", recommendation_id);
        Ok(WriteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_topic_name_trimmed_and_unique() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;

        let id = storage
            .create_topic_impl("  Algebra ", a, student)
            .await
            .created_id()
            .unwrap();
        assert_eq!(
            storage.create_topic_impl("Algebra", a, student).await,
            WriteOutcome::AlreadyExists
        );

        let topic = storage.get_topic_impl(id).await.unwrap().unwrap();
        assert_eq!(topic.topic_name, "Algebra");
        assert_eq!(topic.creator_name.as_deref(), Some("stu"));
        assert_eq!(storage.list_section_topics_impl(a).await.unwrap().len(), 1);
        assert!(storage.get_topic_impl(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recommendations_with_adder() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;
        let topic = storage
            .create_topic_impl("Physics", a, student)
            .await
            .created_id()
            .unwrap();

        assert!(
            storage
                .add_video_recommendation_impl(
                    topic,
                    " https://example.com/v1 ",
                    student,
                    Some("Intro")
                )
                .await
                .is_success()
        );
        assert!(matches!(
            storage
                .add_video_recommendation_impl(topic, "ftp://bad", student, None)
                .await,
            WriteOutcome::Invalid(_)
        ));
        assert_eq!(
            storage
                .add_video_recommendation_impl(404, "https://example.com", student, None)
                .await,
            WriteOutcome::NotFound
        );

        let list = storage.list_topic_recommendations_impl(topic).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].video_url, "https://example.com/v1");
        assert_eq!(list[0].title.as_deref(), Some("Intro"));
        assert_eq!(list[0].adder_name, "stu");
    }

    #[tokio::test]
    async fn test_owner_only_deletes() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let owner = user(&storage, "owner", UserRole::Student).await;
        let other = user(&storage, "other", UserRole::Student).await;
        let topic = storage
            .create_topic_impl("Chemistry", a, owner)
            .await
            .created_id()
            .unwrap();
        let rec = storage
            .add_video_recommendation_impl(topic, "https://example.com/c", owner, None)
            .await
            .created_id()
            .unwrap();

        assert_eq!(
            storage.delete_video_recommendation_impl(rec, other).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            storage.delete_topic_impl(topic, other).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            storage.delete_video_recommendation_impl(rec, owner).await,
            WriteOutcome::Deleted
        );
        assert_eq!(
            storage.delete_topic_impl(topic, owner).await,
            WriteOutcome::Deleted
        );
        assert!(storage.get_topic_impl(topic).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_topic_survives_creator_deletion() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let creator = user(&storage, "creator", UserRole::Student).await;
        let adder = user(&storage, "adder", UserRole::Student).await;
        let topic = storage
            .create_topic_impl("Biology", a, creator)
            .await
            .created_id()
            .unwrap();
        storage
            .add_video_recommendation_impl(topic, "https://example.com/b", adder, None)
            .await;

        storage.delete_user_impl(creator).await;
        let kept = storage.get_topic_impl(topic).await.unwrap().unwrap();
        assert_eq!(kept.created_by, None);
        assert_eq!(kept.creator_name, None);

        // 推荐随推荐者一起删除
        storage.delete_user_impl(adder).await;
        assert!(
            storage
                .list_topic_recommendations_impl(topic)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
