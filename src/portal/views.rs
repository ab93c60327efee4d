use serde::Serialize;

use super::Page;
use crate::models::{
    assignments::entities::Assignment,
    files::entities::FileInfo,
    grades::entities::{SectionGrade, StudentGrade, SubjectSummary},
    messages::entities::ChatMessage,
    recommendations::entities::{Topic, VideoRecommendation},
    sections::entities::{Section, SectionMember},
    subjects::entities::Subject,
    users::entities::{User, UserSummary, UsersWithSections},
};

/// 页面处理结果
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub page: Page,
    pub title: &'static str,
    pub content: PageContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicWithRecommendations {
    #[serde(flatten)]
    pub topic: Topic,
    pub recommendations: Vec<VideoRecommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionRoster {
    #[serde(flatten)]
    pub section: Section,
    pub students: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    /// 班级相关页面在未选择班级时返回可选班级
    SelectSection {
        sections: Vec<Section>,
    },
    StudentDashboard {
        username: String,
        sections: Vec<Section>,
        recent_grades: Vec<StudentGrade>,
    },
    TeacherDashboard {
        username: String,
        sections: Vec<Section>,
        students: Vec<SectionMember>,
    },
    AdminDashboard {
        username: String,
        total_users: u64,
        sections: Vec<Section>,
    },
    Files {
        section: Option<Section>,
        files: Vec<FileInfo>,
    },
    ClassChat {
        section: Section,
        messages: Vec<ChatMessage>,
    },
    VideoRecommendations {
        section: Section,
        topics: Vec<TopicWithRecommendations>,
    },
    StudentMarks {
        subjects: Vec<SubjectSummary>,
    },
    SectionMarks {
        section: Section,
        subjects: Vec<SubjectSummary>,
    },
    Assignments {
        section: Section,
        assignments: Vec<Assignment>,
    },
    GradeManagement {
        section: Section,
        students: Vec<UserSummary>,
        subjects: Vec<Subject>,
        grades: Vec<SectionGrade>,
    },
    UploadTargets {
        sections: Vec<Section>,
        files: Vec<FileInfo>,
    },
    UserManagement {
        users: Vec<User>,
        overview: UsersWithSections,
    },
    SectionManagement {
        sections: Vec<SectionRoster>,
    },
}
