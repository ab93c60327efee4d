//! 按角色分派的门户页面
//!
//! 每个角色对应一张固定的有序菜单，菜单项绑定一个页面处理函数。
//! 处理函数只接收 [`PageContext`]（会话身份、存储和当前选择的班级），
//! 返回可序列化的 [`PageView`]，渲染由展示层负责。

mod pages;
pub mod views;

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::errors::{PortalError, Result};
use crate::models::users::entities::UserRole;
use crate::session::SessionContext;
use crate::storage::Storage;

pub use views::{PageContent, PageView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Dashboard,
    StudyMaterials,
    LectureVideos,
    ClassChat,
    VideoRecommendations,
    MarkAnalysis,
    Assignments,
    GradeManagement,
    UploadPdfs,
    UserManagement,
    SectionManagement,
}

impl Page {
    pub const fn slug(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::StudyMaterials => "study-materials",
            Page::LectureVideos => "lecture-videos",
            Page::ClassChat => "class-chat",
            Page::VideoRecommendations => "video-recommendations",
            Page::MarkAnalysis => "mark-analysis",
            Page::Assignments => "assignments",
            Page::GradeManagement => "grade-management",
            Page::UploadPdfs => "upload-pdfs",
            Page::UserManagement => "user-management",
            Page::SectionManagement => "section-management",
        }
    }
}

impl std::str::FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ALL_PAGES
            .iter()
            .copied()
            .find(|page| page.slug() == s)
            .ok_or_else(|| format!("Unknown page: {s}"))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

const ALL_PAGES: [Page; 11] = [
    Page::Dashboard,
    Page::StudyMaterials,
    Page::LectureVideos,
    Page::ClassChat,
    Page::VideoRecommendations,
    Page::MarkAnalysis,
    Page::Assignments,
    Page::GradeManagement,
    Page::UploadPdfs,
    Page::UserManagement,
    Page::SectionManagement,
];

/// 页面处理函数可以访问的上下文
pub struct PageContext<'a> {
    pub session: &'a SessionContext,
    pub storage: &'a dyn Storage,
    /// 展示层当前选中的班级
    pub section_id: Option<i64>,
}

pub type PageResult = std::result::Result<PageView, DispatchError>;

type ContentResult = std::result::Result<PageContent, DispatchError>;

type PageHandler = for<'a> fn(&'a PageContext<'a>) -> LocalBoxFuture<'a, ContentResult>;

/// 菜单项
#[derive(Clone, Copy)]
pub struct MenuEntry {
    pub page: Page,
    pub title: &'static str,
    handler: PageHandler,
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuEntry")
            .field("page", &self.page)
            .field("title", &self.title)
            .finish()
    }
}

/// 对外暴露的菜单项（不含处理函数）
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub page: Page,
    pub title: &'static str,
}

const STUDENT_MENU: &[MenuEntry] = &[
    MenuEntry {
        page: Page::Dashboard,
        title: "Dashboard",
        handler: pages::student_dashboard,
    },
    MenuEntry {
        page: Page::StudyMaterials,
        title: "Study Materials",
        handler: pages::study_materials,
    },
    MenuEntry {
        page: Page::LectureVideos,
        title: "Lecture Videos",
        handler: pages::lecture_videos,
    },
    MenuEntry {
        page: Page::ClassChat,
        title: "Class Chat",
        handler: pages::class_chat,
    },
    MenuEntry {
        page: Page::VideoRecommendations,
        title: "Video Recommendations",
        handler: pages::video_recommendations,
    },
    MenuEntry {
        page: Page::MarkAnalysis,
        title: "Mark Analysis",
        handler: pages::student_mark_analysis,
    },
    MenuEntry {
        page: Page::Assignments,
        title: "Assignments",
        handler: pages::assignments,
    },
];

const TEACHER_MENU: &[MenuEntry] = &[
    MenuEntry {
        page: Page::Dashboard,
        title: "Dashboard",
        handler: pages::teacher_dashboard,
    },
    MenuEntry {
        page: Page::GradeManagement,
        title: "Grade Management",
        handler: pages::grade_management,
    },
    MenuEntry {
        page: Page::UploadPdfs,
        title: "Upload PDFs",
        handler: pages::upload_pdfs,
    },
    MenuEntry {
        page: Page::LectureVideos,
        title: "Lecture Videos",
        handler: pages::lecture_videos,
    },
    MenuEntry {
        page: Page::ClassChat,
        title: "Class Chat",
        handler: pages::class_chat,
    },
    MenuEntry {
        page: Page::MarkAnalysis,
        title: "Mark Analysis",
        handler: pages::section_mark_analysis,
    },
    MenuEntry {
        page: Page::Assignments,
        title: "Assignments",
        handler: pages::assignments,
    },
];

const ADMIN_MENU: &[MenuEntry] = &[
    MenuEntry {
        page: Page::Dashboard,
        title: "Dashboard",
        handler: pages::admin_dashboard,
    },
    MenuEntry {
        page: Page::UserManagement,
        title: "User Management",
        handler: pages::user_management,
    },
    MenuEntry {
        page: Page::SectionManagement,
        title: "Section Management",
        handler: pages::section_management,
    },
];

/// 角色的菜单
pub fn menu(role: UserRole) -> &'static [MenuEntry] {
    match role {
        UserRole::Student => STUDENT_MENU,
        UserRole::Teacher => TEACHER_MENU,
        UserRole::Admin => ADMIN_MENU,
    }
}

pub fn menu_items(role: UserRole) -> Vec<MenuItem> {
    menu(role)
        .iter()
        .map(|entry| MenuItem {
            page: entry.page,
            title: entry.title,
        })
        .collect()
}

#[derive(Debug)]
pub enum DispatchError {
    /// 所选页面不在该角色的菜单中
    PageNotAvailable { role: UserRole, page: Page },
    SectionNotFound(i64),
    /// 选中的班级不属于当前用户
    SectionAccessDenied(i64),
    Storage(PortalError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::PageNotAvailable { role, page } => {
                write!(f, "Page '{page}' is not available for role {role}")
            }
            DispatchError::SectionNotFound(id) => write!(f, "Section {id} not found"),
            DispatchError::SectionAccessDenied(id) => {
                write!(f, "You are not a member of section {id}")
            }
            DispatchError::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl From<PortalError> for DispatchError {
    fn from(e: PortalError) -> Self {
        DispatchError::Storage(e)
    }
}

/// 调用角色菜单中的页面
pub async fn dispatch(ctx: &PageContext<'_>, page: Page) -> PageResult {
    let role = ctx.session.role;
    let Some(entry) = menu(role).iter().find(|entry| entry.page == page) else {
        warn!(
            "用户 {} ({}) 请求了不在菜单中的页面 {}",
            ctx.session.username, role, page
        );
        return Err(DispatchError::PageNotAvailable { role, page });
    };

    debug!("分派页面 {} 给用户 {}", page, ctx.session.username);
    let content = (entry.handler)(ctx).await?;
    Ok(PageView {
        page,
        title: entry.title,
        content,
    })
}

/// 当前选中班级的校验结果
pub(crate) enum SectionChoice {
    Selected(crate::models::sections::entities::Section),
    /// 尚未选择班级，附带可选项
    Unselected(Vec<crate::models::sections::entities::Section>),
}

/// 解析当前选中的班级：必须存在且当前用户属于该班级
pub(crate) async fn resolve_section(
    ctx: &PageContext<'_>,
) -> std::result::Result<SectionChoice, DispatchError> {
    let Some(section_id) = ctx.section_id else {
        let sections = own_sections(ctx).await?;
        return Ok(SectionChoice::Unselected(sections));
    };

    let Some(section) = ctx.storage.get_section_by_id(section_id).await? else {
        return Err(DispatchError::SectionNotFound(section_id));
    };
    let member = ctx
        .storage
        .is_section_member(ctx.session.user_id, ctx.session.role, section_id)
        .await?;
    if !member {
        warn!(
            "用户 {} 尝试访问未加入的班级 {}",
            ctx.session.username, section_id
        );
        return Err(DispatchError::SectionAccessDenied(section_id));
    }
    Ok(SectionChoice::Selected(section))
}

/// 当前用户可以选择的班级
pub(crate) async fn own_sections(
    ctx: &PageContext<'_>,
) -> Result<Vec<crate::models::sections::entities::Section>> {
    match ctx.session.role {
        UserRole::Student => ctx.storage.list_student_sections(ctx.session.user_id).await,
        UserRole::Teacher => ctx.storage.list_teacher_sections(ctx.session.user_id).await,
        UserRole::Admin => ctx.storage.list_sections().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_storage;
    use std::sync::Arc;

    async fn login_as(
        storage: &Arc<dyn Storage>,
        username: &str,
        role: UserRole,
    ) -> SessionContext {
        let user_id = storage
            .create_user(username, "$argon2id$test", role)
            .await
            .created_id()
            .unwrap();
        SessionContext {
            user_id,
            role,
            username: username.to_string(),
        }
    }

    #[test]
    fn test_menus_are_ordered_per_role() {
        let titles = |role| {
            menu(role)
                .iter()
                .map(|entry| entry.title)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            titles(UserRole::Student),
            vec![
                "Dashboard",
                "Study Materials",
                "Lecture Videos",
                "Class Chat",
                "Video Recommendations",
                "Mark Analysis",
                "Assignments"
            ]
        );
        assert_eq!(
            titles(UserRole::Teacher),
            vec![
                "Dashboard",
                "Grade Management",
                "Upload PDFs",
                "Lecture Videos",
                "Class Chat",
                "Mark Analysis",
                "Assignments"
            ]
        );
        assert_eq!(
            titles(UserRole::Admin),
            vec!["Dashboard", "User Management", "Section Management"]
        );
    }

    #[test]
    fn test_page_slugs_roundtrip() {
        for page in ALL_PAGES {
            assert_eq!(page.slug().parse::<Page>(), Ok(page));
        }
        assert!("analytics".parse::<Page>().is_err());
    }

    #[tokio::test]
    async fn test_page_outside_menu_is_rejected() {
        let storage = memory_storage().await;
        let student = login_as(&storage, "stu", UserRole::Student).await;
        let ctx = PageContext {
            session: &student,
            storage: storage.as_ref(),
            section_id: None,
        };

        for page in [Page::UserManagement, Page::GradeManagement, Page::UploadPdfs] {
            assert!(matches!(
                dispatch(&ctx, page).await,
                Err(DispatchError::PageNotAvailable { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_dashboard_differs_by_role() {
        let storage = memory_storage().await;
        let admin = login_as(&storage, "root", UserRole::Admin).await;
        let teacher = login_as(&storage, "tina", UserRole::Teacher).await;

        let ctx = PageContext {
            session: &admin,
            storage: storage.as_ref(),
            section_id: None,
        };
        let view = dispatch(&ctx, Page::Dashboard).await.unwrap();
        assert_eq!(view.title, "Dashboard");
        assert!(matches!(
            view.content,
            PageContent::AdminDashboard { total_users: 2, .. }
        ));

        let ctx = PageContext {
            session: &teacher,
            storage: storage.as_ref(),
            section_id: None,
        };
        let view = dispatch(&ctx, Page::Dashboard).await.unwrap();
        assert!(matches!(view.content, PageContent::TeacherDashboard { .. }));
    }

    #[tokio::test]
    async fn test_section_pages_require_selection_and_membership() {
        let storage = memory_storage().await;
        let student = login_as(&storage, "stu", UserRole::Student).await;
        let mine = storage.create_section("10-A").await.created_id().unwrap();
        let theirs = storage.create_section("10-B").await.created_id().unwrap();
        storage.assign_student_to_section(student.user_id, mine).await;
        storage.save_message(mine, student.user_id, "hello").await;

        let unselected = PageContext {
            session: &student,
            storage: storage.as_ref(),
            section_id: None,
        };
        match dispatch(&unselected, Page::ClassChat).await.unwrap().content {
            PageContent::SelectSection { sections } => {
                assert_eq!(sections.len(), 1);
                assert_eq!(sections[0].section_name, "10-A");
            }
            other => panic!("unexpected content: {other:?}"),
        }

        let selected = PageContext {
            session: &student,
            storage: storage.as_ref(),
            section_id: Some(mine),
        };
        match dispatch(&selected, Page::ClassChat).await.unwrap().content {
            PageContent::ClassChat { messages, .. } => assert_eq!(messages.len(), 1),
            other => panic!("unexpected content: {other:?}"),
        }

        let foreign = PageContext {
            session: &student,
            storage: storage.as_ref(),
            section_id: Some(theirs),
        };
        assert!(matches!(
            dispatch(&foreign, Page::ClassChat).await,
            Err(DispatchError::SectionAccessDenied(id)) if id == theirs
        ));

        let missing = PageContext {
            session: &student,
            storage: storage.as_ref(),
            section_id: Some(404),
        };
        assert!(matches!(
            dispatch(&missing, Page::Assignments).await,
            Err(DispatchError::SectionNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_mark_analysis_views() {
        let storage = memory_storage().await;
        let teacher = login_as(&storage, "tina", UserRole::Teacher).await;
        let student = login_as(&storage, "stu", UserRole::Student).await;
        let section = storage.create_section("10-A").await.created_id().unwrap();
        storage.assign_teacher_to_section(teacher.user_id, section).await;
        storage.assign_student_to_section(student.user_id, section).await;
        let math = storage
            .create_subject("Math", section, teacher.user_id)
            .await
            .created_id()
            .unwrap();
        storage.add_grade(student.user_id, math, 70.0).await;
        storage.add_grade(student.user_id, math, 90.0).await;

        let ctx = PageContext {
            session: &student,
            storage: storage.as_ref(),
            section_id: None,
        };
        match dispatch(&ctx, Page::MarkAnalysis).await.unwrap().content {
            PageContent::StudentMarks { subjects } => {
                assert_eq!(subjects.len(), 1);
                assert_eq!(subjects[0].average, 80.0);
            }
            other => panic!("unexpected content: {other:?}"),
        }

        let ctx = PageContext {
            session: &teacher,
            storage: storage.as_ref(),
            section_id: Some(section),
        };
        match dispatch(&ctx, Page::MarkAnalysis).await.unwrap().content {
            PageContent::SectionMarks { subjects, .. } => {
                assert_eq!(subjects[0].subject_name, "Math");
                assert_eq!(subjects[0].grades, vec![70.0, 90.0]);
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }
}
