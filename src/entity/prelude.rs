//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::files::{ActiveModel as FileActiveModel, Entity as Files, Model as FileModel};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::messages::{
    ActiveModel as MessageActiveModel, Entity as Messages, Model as MessageModel,
};
pub use super::recommendation_topics::{
    ActiveModel as TopicActiveModel, Entity as RecommendationTopics, Model as TopicModel,
};
pub use super::sections::{
    ActiveModel as SectionActiveModel, Entity as Sections, Model as SectionModel,
};
pub use super::student_sections::{
    ActiveModel as StudentSectionActiveModel, Entity as StudentSections,
    Model as StudentSectionModel,
};
pub use super::subjects::{
    ActiveModel as SubjectActiveModel, Entity as Subjects, Model as SubjectModel,
};
pub use super::teacher_sections::{
    ActiveModel as TeacherSectionActiveModel, Entity as TeacherSections,
    Model as TeacherSectionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::video_recommendations::{
    ActiveModel as VideoRecommendationActiveModel, Entity as VideoRecommendations,
    Model as VideoRecommendationModel,
};
