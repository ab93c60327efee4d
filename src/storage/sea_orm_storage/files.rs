use super::{SeaOrmStorage, settle};
use crate::entity::files::{ActiveModel, Column, Entity as Files, Relation};
use crate::entity::sections::{Column as SectionColumn, Entity as Sections};
use crate::entity::student_sections::{self, Entity as StudentSections};
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome,
    files::entities::{FileInfo, FileKind, NewFile, StoredFile},
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::{info, warn};

// id, filename, file_type, file_size, uploaded_by, section_id, uploaded_at, section_name
type FileRow = (i64, String, String, i64, Option<i64>, i64, i64, String);

fn parse_kind(file_id: i64, file_type: &str) -> Result<FileKind> {
    file_type
        .parse::<FileKind>()
        .map_err(|e| PortalError::database_operation(format!("文件 {file_id} 的类别无效: {e}")))
}

fn into_file_info(row: FileRow) -> Result<FileInfo> {
    let (id, filename, file_type, file_size, uploaded_by, section_id, uploaded_at, section_name) =
        row;
    Ok(FileInfo {
        id,
        filename,
        file_type: parse_kind(id, &file_type)?,
        file_size,
        uploaded_by,
        section_id,
        section_name,
        uploaded_at: DateTime::<Utc>::from_timestamp(uploaded_at, 0).unwrap_or_default(),
    })
}

impl SeaOrmStorage {
    /// 保存上传的文件
    pub async fn add_file_impl(&self, file: NewFile) -> WriteOutcome {
        settle("保存文件", self.try_add_file(file).await)
    }

    async fn try_add_file(&self, file: NewFile) -> std::result::Result<WriteOutcome, DbErr> {
        if file.filename.trim().is_empty() {
            return Ok(WriteOutcome::Invalid("文件名不能为空".to_string()));
        }
        if file.data.is_empty() {
            return Ok(WriteOutcome::Invalid("文件内容为空".to_string()));
        }
        if !self.section_exists(file.section_id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        let model = ActiveModel {
            filename: Set(file.filename),
            file_type: Set(file.kind.to_string()),
            file_size: Set(file.data.len() as i64),
            file_data: Set(file.data),
            uploaded_by: Set(Some(file.uploaded_by)),
            section_id: Set(file.section_id),
            uploaded_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            "保存文件: {} ({} 字节) 到班级 {}",
            model.filename, model.file_size, model.section_id
        );
        Ok(WriteOutcome::Created(model.id))
    }

    /// 查询文件元数据（不读取文件内容），按上传时间倒序
    async fn query_file_infos(&self, condition: Condition) -> Result<Vec<FileInfo>> {
        let rows = Files::find()
            .select_only()
            .columns([
                Column::Id,
                Column::Filename,
                Column::FileType,
                Column::FileSize,
                Column::UploadedBy,
                Column::SectionId,
                Column::UploadedAt,
            ])
            .column(SectionColumn::SectionName)
            .join(JoinType::InnerJoin, Relation::Section.def())
            .filter(condition)
            .order_by_desc(Column::UploadedAt)
            .order_by_desc(Column::Id)
            .into_tuple::<FileRow>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询文件列表失败: {e}")))?;

        rows.into_iter().map(into_file_info).collect()
    }

    /// 班级中的文件，可按类别筛选
    pub async fn list_section_files_impl(
        &self,
        section_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileInfo>> {
        let mut condition = Condition::all().add(Column::SectionId.eq(section_id));
        if let Some(kind) = kind {
            condition = condition.add(Column::FileType.eq(kind.to_string()));
        }
        self.query_file_infos(condition).await
    }

    /// 指定类别的所有文件
    pub async fn list_files_by_kind_impl(&self, kind: FileKind) -> Result<Vec<FileInfo>> {
        self.query_file_infos(Condition::all().add(Column::FileType.eq(kind.to_string())))
            .await
    }

    /// 学生所在班级的文件
    pub async fn list_student_files_impl(
        &self,
        student_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileInfo>> {
        let mut condition =
            Condition::all().add(Column::SectionId.in_subquery(student_section_ids(student_id)));
        if let Some(kind) = kind {
            condition = condition.add(Column::FileType.eq(kind.to_string()));
        }
        self.query_file_infos(condition).await
    }

    /// 获取完整文件（含内容）
    pub async fn get_file_impl(&self, file_id: i64) -> Result<Option<StoredFile>> {
        let result = Files::find_by_id(file_id)
            .find_also_related(Sections)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询文件失败: {e}")))?;

        let Some((file, section)) = result else {
            return Ok(None);
        };
        let file_type = parse_kind(file.id, &file.file_type)?;
        Ok(Some(StoredFile {
            info: FileInfo {
                id: file.id,
                filename: file.filename,
                file_type,
                file_size: file.file_size,
                uploaded_by: file.uploaded_by,
                section_id: file.section_id,
                section_name: section.map(|s| s.section_name).unwrap_or_default(),
                uploaded_at: DateTime::<Utc>::from_timestamp(file.uploaded_at, 0)
                    .unwrap_or_default(),
            },
            data: file.file_data,
        }))
    }

    /// 删除文件，只有上传者可以删除
    pub async fn delete_file_impl(&self, file_id: i64, actor_id: i64) -> WriteOutcome {
        settle("删除文件", self.try_delete_file(file_id, actor_id).await)
    }

    async fn try_delete_file(
        &self,
        file_id: i64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let uploader = Files::find_by_id(file_id)
            .select_only()
            .column(Column::UploadedBy)
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await?;

        let Some(uploader) = uploader else {
            return Ok(WriteOutcome::NotFound);
        };
        if uploader != Some(actor_id) {
            warn!("用户 {} 尝试删除非本人上传的文件 {}", actor_id, file_id);
            return Ok(WriteOutcome::Forbidden);
        }

        Files::delete_by_id(file_id).exec(&self.db).await?;
        info!("删除文件: {}", file_id);
        Ok(WriteOutcome::Deleted)
    }
}

/// 学生所在班级 ID 的子查询
pub(super) fn student_section_ids(student_id: i64) -> SelectStatement {
    Query::select()
        .column(student_sections::Column::SectionId)
        .from(StudentSections)
        .and_where(student_sections::Column::StudentId.eq(student_id))
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;
    use crate::models::users::entities::UserRole;

    fn pdf(name: &str, uploaded_by: i64, section_id: i64) -> NewFile {
        NewFile {
            filename: name.to_string(),
            kind: FileKind::Pdf,
            data: b"%PDF-1.4 test".to_vec(),
            uploaded_by,
            section_id,
        }
    }

    #[tokio::test]
    async fn test_add_and_get_file_roundtrip_bytes() {
        let storage = storage().await;
        let s = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;

        let id = storage
            .add_file_impl(pdf("notes.pdf", teacher, s))
            .await
            .created_id()
            .unwrap();

        let stored = storage.get_file_impl(id).await.unwrap().unwrap();
        assert_eq!(stored.data, b"%PDF-1.4 test");
        assert_eq!(stored.info.file_size, 13);
        assert_eq!(stored.info.section_name, "A");
        assert_eq!(stored.info.file_type, FileKind::Pdf);
    }

    #[tokio::test]
    async fn test_add_file_validation() {
        let storage = storage().await;
        let s = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;

        let mut empty = pdf("empty.pdf", teacher, s);
        empty.data.clear();
        assert!(matches!(
            storage.add_file_impl(empty).await,
            WriteOutcome::Invalid(_)
        ));
        assert_eq!(
            storage.add_file_impl(pdf("x.pdf", teacher, 404)).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_only_uploader_can_delete() {
        let storage = storage().await;
        let s = section(&storage, "A").await;
        let owner = user(&storage, "owner", UserRole::Teacher).await;
        let other = user(&storage, "other", UserRole::Teacher).await;

        let id = storage
            .add_file_impl(pdf("notes.pdf", owner, s))
            .await
            .created_id()
            .unwrap();

        assert_eq!(
            storage.delete_file_impl(id, other).await,
            WriteOutcome::Forbidden
        );
        assert!(storage.get_file_impl(id).await.unwrap().is_some());

        assert_eq!(storage.delete_file_impl(id, owner).await, WriteOutcome::Deleted);
        assert!(storage.get_file_impl(id).await.unwrap().is_none());
        assert_eq!(
            storage.delete_file_impl(id, owner).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_file_listings() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let b = section(&storage, "B").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let student = user(&storage, "stu", UserRole::Student).await;
        storage.assign_to_section_impl(student, UserRole::Student, a).await;

        storage.add_file_impl(pdf("a1.pdf", teacher, a)).await;
        storage
            .add_file_impl(NewFile {
                filename: "a2.mp4".to_string(),
                kind: FileKind::Video,
                data: vec![0, 0, 0, 0x18, b'f', b't', b'y', b'p'],
                uploaded_by: teacher,
                section_id: a,
            })
            .await;
        storage.add_file_impl(pdf("b1.pdf", teacher, b)).await;

        let all_a = storage.list_section_files_impl(a, None).await.unwrap();
        assert_eq!(all_a.len(), 2);
        // 同一秒内上传时按 ID 倒序
        assert_eq!(all_a[0].filename, "a2.mp4");

        let videos = storage
            .list_section_files_impl(a, Some(FileKind::Video))
            .await
            .unwrap();
        assert_eq!(videos.len(), 1);

        let pdfs = storage.list_files_by_kind_impl(FileKind::Pdf).await.unwrap();
        assert_eq!(pdfs.len(), 2);

        let student_files = storage
            .list_student_files_impl(student, Some(FileKind::Pdf))
            .await
            .unwrap();
        assert_eq!(student_files.len(), 1);
        assert_eq!(student_files[0].filename, "a1.pdf");
        assert!(
            storage
                .list_section_files_impl(404, None)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_uploader_deleted_keeps_file() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let id = storage
            .add_file_impl(pdf("keep.pdf", teacher, a))
            .await
            .created_id()
            .unwrap();

        storage.delete_user_impl(teacher).await;
        let stored = storage.get_file_impl(id).await.unwrap().unwrap();
        assert_eq!(stored.info.uploaded_by, None);
        assert_eq!(
            storage.delete_file_impl(id, teacher).await,
            WriteOutcome::Forbidden
        );
    }

    #[tokio::test]
    async fn test_unknown_file_type_is_reported() {
        let storage = storage().await;
        let s1 = section(&storage, "7-A").await;
        let id = ActiveModel {
            filename: Set("legacy.doc".to_string()),
            file_type: Set("doc".to_string()),
            file_size: Set(3),
            file_data: Set(b"abc".to_vec()),
            uploaded_by: Set(None),
            section_id: Set(s1),
            uploaded_at: Set(0),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap()
        .id;

        assert!(storage.list_section_files_impl(s1, None).await.is_err());
        assert!(storage.get_file_impl(id).await.is_err());
    }
}
