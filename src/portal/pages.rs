//! 各角色页面的处理函数

use futures_util::future::LocalBoxFuture;

use super::views::{PageContent, SectionRoster, TopicWithRecommendations};
use super::{ContentResult, PageContext, SectionChoice, own_sections, resolve_section};
use crate::models::files::entities::FileKind;
use crate::models::grades::entities::SubjectSummary;
use crate::models::users::entities::UserRole;

/// 学生主页显示的最近成绩条数
const RECENT_GRADES: usize = 5;

// 生成菜单表所需的函数指针：外层返回装箱的 future，内层是普通的 async fn
macro_rules! page_handler {
    ($(#[$meta:meta])* $name:ident($ctx:ident) $body:block) => {
        $(#[$meta])*
        pub(super) fn $name<'a>($ctx: &'a PageContext<'a>) -> LocalBoxFuture<'a, ContentResult> {
            async fn handle($ctx: &PageContext<'_>) -> ContentResult $body
            Box::pin(handle($ctx))
        }
    };
}

/// 当前选中的班级；未选择时直接返回班级选择页
macro_rules! selected_section {
    ($ctx:expr) => {
        match resolve_section($ctx).await? {
            SectionChoice::Selected(section) => section,
            SectionChoice::Unselected(sections) => {
                return Ok(PageContent::SelectSection { sections });
            }
        }
    };
}

page_handler! {
    student_dashboard(ctx) {
        let student_id = ctx.session.user_id;
        let sections = ctx.storage.list_student_sections(student_id).await?;
        let mut recent_grades = ctx.storage.list_student_grades(student_id).await?;
        recent_grades.reverse();
        recent_grades.truncate(RECENT_GRADES);

        Ok(PageContent::StudentDashboard {
            username: ctx.session.username.clone(),
            sections,
            recent_grades,
        })
    }
}

page_handler! {
    teacher_dashboard(ctx) {
        let teacher_id = ctx.session.user_id;
        Ok(PageContent::TeacherDashboard {
            username: ctx.session.username.clone(),
            sections: ctx.storage.list_teacher_sections(teacher_id).await?,
            students: ctx.storage.list_teacher_section_students(teacher_id).await?,
        })
    }
}

page_handler! {
    admin_dashboard(ctx) {
        Ok(PageContent::AdminDashboard {
            username: ctx.session.username.clone(),
            total_users: ctx.storage.count_users().await?,
            sections: ctx.storage.list_sections().await?,
        })
    }
}

page_handler! {
    /// 学习资料：选中班级的 PDF，未选择时为所在全部班级的 PDF
    study_materials(ctx) {
        if ctx.section_id.is_none() {
            let files = ctx
                .storage
                .list_student_files(ctx.session.user_id, Some(FileKind::Pdf))
                .await?;
            return Ok(PageContent::Files { section: None, files });
        }

        let section = selected_section!(ctx);
        let files = ctx
            .storage
            .list_section_files(section.id, Some(FileKind::Pdf))
            .await?;
        Ok(PageContent::Files {
            section: Some(section),
            files,
        })
    }
}

page_handler! {
    lecture_videos(ctx) {
        if ctx.section_id.is_none() && ctx.session.role == UserRole::Student {
            let files = ctx
                .storage
                .list_student_files(ctx.session.user_id, Some(FileKind::Video))
                .await?;
            return Ok(PageContent::Files { section: None, files });
        }

        let section = selected_section!(ctx);
        let files = ctx
            .storage
            .list_section_files(section.id, Some(FileKind::Video))
            .await?;
        Ok(PageContent::Files {
            section: Some(section),
            files,
        })
    }
}

page_handler! {
    class_chat(ctx) {
        let section = selected_section!(ctx);
        let messages = ctx.storage.list_section_messages(section.id).await?;
        Ok(PageContent::ClassChat { section, messages })
    }
}

page_handler! {
    video_recommendations(ctx) {
        let section = selected_section!(ctx);
        let mut topics = Vec::new();
        for topic in ctx.storage.list_section_topics(section.id).await? {
            let recommendations = ctx.storage.list_topic_recommendations(topic.id).await?;
            topics.push(TopicWithRecommendations {
                topic,
                recommendations,
            });
        }
        Ok(PageContent::VideoRecommendations { section, topics })
    }
}

page_handler! {
    student_mark_analysis(ctx) {
        Ok(PageContent::StudentMarks {
            subjects: ctx.storage.student_subject_grades(ctx.session.user_id).await?,
        })
    }
}

page_handler! {
    section_mark_analysis(ctx) {
        let section = selected_section!(ctx);
        let grades = ctx.storage.list_section_grades(section.id).await?;
        Ok(PageContent::SectionMarks {
            section,
            subjects: SubjectSummary::group(
                grades
                    .into_iter()
                    .map(|g| (g.subject_id, g.subject_name, g.grade)),
            ),
        })
    }
}

page_handler! {
    assignments(ctx) {
        let section = selected_section!(ctx);
        let assignments = ctx.storage.list_section_assignments(section.id).await?;
        Ok(PageContent::Assignments {
            section,
            assignments,
        })
    }
}

page_handler! {
    grade_management(ctx) {
        let section = selected_section!(ctx);
        Ok(PageContent::GradeManagement {
            students: ctx.storage.list_section_students(section.id).await?,
            subjects: ctx.storage.list_section_subjects(section.id).await?,
            grades: ctx.storage.list_section_grades(section.id).await?,
            section,
        })
    }
}

page_handler! {
    /// 上传页面：可上传的班级，以及选中班级中已有的 PDF
    upload_pdfs(ctx) {
        let files = match ctx.section_id {
            Some(_) => {
                let section = selected_section!(ctx);
                ctx.storage
                    .list_section_files(section.id, Some(FileKind::Pdf))
                    .await?
            }
            None => Vec::new(),
        };
        Ok(PageContent::UploadTargets {
            sections: own_sections(ctx).await?,
            files,
        })
    }
}

page_handler! {
    user_management(ctx) {
        Ok(PageContent::UserManagement {
            users: ctx.storage.list_users().await?,
            overview: ctx.storage.list_users_with_sections().await?,
        })
    }
}

page_handler! {
    section_management(ctx) {
        let mut sections = Vec::new();
        for section in ctx.storage.list_sections().await? {
            let students = ctx.storage.list_section_students(section.id).await?;
            sections.push(SectionRoster { section, students });
        }
        Ok(PageContent::SectionManagement { sections })
    }
}
