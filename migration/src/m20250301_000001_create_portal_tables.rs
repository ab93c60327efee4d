use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建班级（分组）表
        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sections::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Sections::SectionName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sections::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建教师-班级关联表
        manager
            .create_table(
                Table::create()
                    .table(TeacherSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherSections::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeacherSections::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherSections::SectionId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherSections::Table, TeacherSections::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherSections::Table, TeacherSections::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建学生-班级关联表
        manager
            .create_table(
                Table::create()
                    .table(StudentSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentSections::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentSections::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSections::SectionId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentSections::Table, StudentSections::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentSections::Table, StudentSections::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建科目表
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subjects::SubjectName).string().not_null())
                    .col(ColumnDef::new(Subjects::SectionId).big_integer().not_null())
                    .col(ColumnDef::new(Subjects::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Subjects::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Subjects::Table, Subjects::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Subjects::Table, Subjects::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建文件表（文件内容直接存储在数据库中）
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::Filename).string().not_null())
                    .col(ColumnDef::new(Files::FileType).string().not_null())
                    .col(ColumnDef::new(Files::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Files::FileData).blob().not_null())
                    .col(ColumnDef::new(Files::UploadedBy).big_integer().null())
                    .col(ColumnDef::new(Files::SectionId).big_integer().not_null())
                    .col(ColumnDef::new(Files::UploadedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::UploadedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成绩表
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Grades::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::SubjectId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::Grade).double().not_null())
                    .col(
                        ColumnDef::new(Grades::AssignmentDate)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作业表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text().null())
                    .col(ColumnDef::new(Assignments::DueDate).big_integer().not_null())
                    .col(
                        ColumnDef::new(Assignments::SectionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::MaxGrade)
                            .double()
                            .not_null()
                            .default(100.0),
                    )
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建班级聊天消息表
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::SectionId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Content).text().not_null())
                    .col(ColumnDef::new(Messages::Timestamp).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Messages::Table, Messages::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Messages::Table, Messages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建视频推荐主题表
        manager
            .create_table(
                Table::create()
                    .table(RecommendationTopics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendationTopics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecommendationTopics::TopicName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationTopics::SectionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationTopics::CreatedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationTopics::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecommendationTopics::Table, RecommendationTopics::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecommendationTopics::Table, RecommendationTopics::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建视频推荐表
        manager
            .create_table(
                Table::create()
                    .table(VideoRecommendations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VideoRecommendations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VideoRecommendations::TopicId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VideoRecommendations::VideoUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VideoRecommendations::Title).string().null())
                    .col(
                        ColumnDef::new(VideoRecommendations::AddedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VideoRecommendations::AddedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(VideoRecommendations::Table, VideoRecommendations::TopicId)
                            .to(RecommendationTopics::Table, RecommendationTopics::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(VideoRecommendations::Table, VideoRecommendations::AddedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 组合唯一约束
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_teacher_sections_pair")
                    .table(TeacherSections::Table)
                    .col(TeacherSections::TeacherId)
                    .col(TeacherSections::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_student_sections_pair")
                    .table(StudentSections::Table)
                    .col(StudentSections::StudentId)
                    .col(StudentSections::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_subjects_name_section")
                    .table(Subjects::Table)
                    .col(Subjects::SubjectName)
                    .col(Subjects::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_recommendation_topics_name_section")
                    .table(RecommendationTopics::Table)
                    .col(RecommendationTopics::TopicName)
                    .col(RecommendationTopics::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按班级查询的索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_section_id")
                    .table(Files::Table)
                    .col(Files::SectionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_messages_section_id")
                    .table(Messages::Table)
                    .col(Messages::SectionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grades_student_id")
                    .table(Grades::Table)
                    .col(Grades::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(VideoRecommendations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecommendationTopics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentSections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeacherSections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sections {
    #[sea_orm(iden = "sections")]
    Table,
    Id,
    SectionName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TeacherSections {
    #[sea_orm(iden = "teacher_sections")]
    Table,
    Id,
    TeacherId,
    SectionId,
}

#[derive(DeriveIden)]
enum StudentSections {
    #[sea_orm(iden = "student_sections")]
    Table,
    Id,
    StudentId,
    SectionId,
}

#[derive(DeriveIden)]
enum Subjects {
    #[sea_orm(iden = "subjects")]
    Table,
    Id,
    SubjectName,
    SectionId,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Files {
    #[sea_orm(iden = "files")]
    Table,
    Id,
    Filename,
    FileType,
    FileSize,
    FileData,
    UploadedBy,
    SectionId,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Grades {
    #[sea_orm(iden = "grades")]
    Table,
    Id,
    StudentId,
    SubjectId,
    Grade,
    AssignmentDate,
}

#[derive(DeriveIden)]
enum Assignments {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    Title,
    Description,
    DueDate,
    SectionId,
    MaxGrade,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Messages {
    #[sea_orm(iden = "messages")]
    Table,
    Id,
    SectionId,
    UserId,
    Content,
    Timestamp,
}

#[derive(DeriveIden)]
enum RecommendationTopics {
    #[sea_orm(iden = "recommendation_topics")]
    Table,
    Id,
    TopicName,
    SectionId,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VideoRecommendations {
    #[sea_orm(iden = "video_recommendations")]
    Table,
    Id,
    TopicId,
    VideoUrl,
    Title,
    AddedBy,
    AddedAt,
}
