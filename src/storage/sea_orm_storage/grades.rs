use super::{SeaOrmStorage, settle};
use crate::entity::grades::{ActiveModel, Column, Entity as Grades, Relation};
use crate::entity::student_sections::{self, Entity as StudentSections};
use crate::entity::subjects::{Column as SubjectColumn, Entity as Subjects};
use crate::entity::users::Column as UserColumn;
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome,
    grades::entities::{SectionGrade, StudentGrade, SubjectSummary},
};
use crate::utils::validate::validate_grade;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::info;

fn timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

impl SeaOrmStorage {
    /// 录入成绩
    pub async fn add_grade_impl(
        &self,
        student_id: i64,
        subject_id: i64,
        grade: f64,
    ) -> WriteOutcome {
        if let Err(msg) = validate_grade(grade) {
            return WriteOutcome::Invalid(msg.to_string());
        }
        settle(
            "录入成绩",
            self.try_add_grade(student_id, subject_id, grade).await,
        )
    }

    async fn try_add_grade(
        &self,
        student_id: i64,
        subject_id: i64,
        grade: f64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(subject) = Subjects::find_by_id(subject_id).one(&self.db).await? else {
            return Ok(WriteOutcome::NotFound);
        };

        // 学生必须在科目所属班级中
        let enrolled = StudentSections::find()
            .filter(student_sections::Column::StudentId.eq(student_id))
            .filter(student_sections::Column::SectionId.eq(subject.section_id))
            .count(&self.db)
            .await?;
        if enrolled == 0 {
            return Ok(WriteOutcome::Invalid(format!(
                "学生 {student_id} 不在科目 {} 所属的班级中",
                subject.subject_name
            )));
        }

        let model = ActiveModel {
            student_id: Set(student_id),
            subject_id: Set(subject_id),
            grade: Set(grade),
            assignment_date: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            "录入成绩: 学生 {} 科目 {} 成绩 {}",
            student_id, subject.subject_name, grade
        );
        Ok(WriteOutcome::Created(model.id))
    }

    /// 成绩所在的班级（经由科目）
    async fn grade_section(
        &self,
        grade_id: i64,
    ) -> std::result::Result<Option<(crate::entity::grades::Model, i64)>, DbErr> {
        let result = Grades::find_by_id(grade_id)
            .find_also_related(Subjects)
            .one(&self.db)
            .await?;
        Ok(result.and_then(|(grade, subject)| subject.map(|s| (grade, s.section_id))))
    }

    /// 修改成绩，操作者必须任教该科目所在的班级
    pub async fn update_grade_impl(
        &self,
        grade_id: i64,
        new_grade: f64,
        actor_id: i64,
    ) -> WriteOutcome {
        if let Err(msg) = validate_grade(new_grade) {
            return WriteOutcome::Invalid(msg.to_string());
        }
        settle(
            "修改成绩",
            self.try_update_grade(grade_id, new_grade, actor_id).await,
        )
    }

    async fn try_update_grade(
        &self,
        grade_id: i64,
        new_grade: f64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some((grade, section_id)) = self.grade_section(grade_id).await? else {
            return Ok(WriteOutcome::NotFound);
        };
        if !self.teaches_section(actor_id, section_id).await? {
            return Ok(WriteOutcome::Forbidden);
        }

        let mut model: ActiveModel = grade.into();
        model.grade = Set(new_grade);
        model.update(&self.db).await?;

        info!("修改成绩: {} -> {}", grade_id, new_grade);
        Ok(WriteOutcome::Updated)
    }

    /// 删除成绩，操作者必须任教该科目所在的班级
    pub async fn delete_grade_impl(&self, grade_id: i64, actor_id: i64) -> WriteOutcome {
        settle("删除成绩", self.try_delete_grade(grade_id, actor_id).await)
    }

    async fn try_delete_grade(
        &self,
        grade_id: i64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some((_, section_id)) = self.grade_section(grade_id).await? else {
            return Ok(WriteOutcome::NotFound);
        };
        if !self.teaches_section(actor_id, section_id).await? {
            return Ok(WriteOutcome::Forbidden);
        }

        Grades::delete_by_id(grade_id).exec(&self.db).await?;
        info!("删除成绩: {}", grade_id);
        Ok(WriteOutcome::Deleted)
    }

    /// 学生的所有成绩，按录入时间排序
    pub async fn list_student_grades_impl(&self, student_id: i64) -> Result<Vec<StudentGrade>> {
        let rows = Grades::find()
            .select_only()
            .column(Column::Id)
            .column(Column::SubjectId)
            .column(SubjectColumn::SubjectName)
            .column(Column::Grade)
            .column(Column::AssignmentDate)
            .join(JoinType::InnerJoin, Relation::Subject.def())
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::AssignmentDate)
            .order_by_asc(Column::Id)
            .into_tuple::<(i64, i64, String, f64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生成绩失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, subject_id, subject_name, grade, assignment_date)| StudentGrade {
                    id,
                    subject_id,
                    subject_name,
                    grade,
                    assignment_date: timestamp(assignment_date),
                },
            )
            .collect())
    }

    /// 按科目分组的学生成绩，不同班级的同名科目分开统计
    pub async fn student_subject_grades_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<SubjectSummary>> {
        let grades = self.list_student_grades_impl(student_id).await?;
        Ok(SubjectSummary::group(
            grades
                .into_iter()
                .map(|g| (g.subject_id, g.subject_name, g.grade)),
        ))
    }

    /// 班级成绩：科目属于该班级且学生在该班级中
    pub async fn list_section_grades_impl(&self, section_id: i64) -> Result<Vec<SectionGrade>> {
        let rows = Grades::find()
            .select_only()
            .column(Column::Id)
            .column(Column::StudentId)
            .column(UserColumn::Username)
            .column(Column::SubjectId)
            .column(SubjectColumn::SubjectName)
            .column(Column::Grade)
            .column(Column::AssignmentDate)
            .join(JoinType::InnerJoin, Relation::Subject.def())
            .join(JoinType::InnerJoin, Relation::Student.def())
            .filter(SubjectColumn::SectionId.eq(section_id))
            .filter(
                Column::StudentId.in_subquery(
                    sea_orm::sea_query::Query::select()
                        .column(student_sections::Column::StudentId)
                        .from(StudentSections)
                        .and_where(student_sections::Column::SectionId.eq(section_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(UserColumn::Username)
            .order_by_asc(SubjectColumn::SubjectName)
            .order_by_asc(Column::AssignmentDate)
            .order_by_asc(Column::Id)
            .into_tuple::<(i64, i64, String, i64, String, f64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级成绩失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, student_id, username, subject_id, subject_name, grade, assignment_date)| {
                    SectionGrade {
                        id,
                        student_id,
                        username,
                        subject_id,
                        subject_name,
                        grade,
                        assignment_date: timestamp(assignment_date),
                    }
                },
            )
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;
    use crate::models::users::entities::UserRole;

    struct Fixture {
        storage: SeaOrmStorage,
        section: i64,
        teacher: i64,
        student: i64,
        subject: i64,
    }

    async fn fixture() -> Fixture {
        let storage = storage().await;
        let section = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let student = user(&storage, "stu", UserRole::Student).await;
        storage
            .assign_to_section_impl(teacher, UserRole::Teacher, section)
            .await;
        storage
            .assign_to_section_impl(student, UserRole::Student, section)
            .await;
        let subject = storage
            .create_subject_impl("Math", section, teacher)
            .await
            .created_id()
            .unwrap();
        Fixture {
            storage,
            section,
            teacher,
            student,
            subject,
        }
    }

    #[tokio::test]
    async fn test_grade_range_enforced() {
        let f = fixture().await;
        assert!(matches!(
            f.storage.add_grade_impl(f.student, f.subject, 101.0).await,
            WriteOutcome::Invalid(_)
        ));
        assert!(matches!(
            f.storage.add_grade_impl(f.student, f.subject, -0.5).await,
            WriteOutcome::Invalid(_)
        ));
        assert!(
            f.storage
                .list_student_grades_impl(f.student)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            f.storage
                .add_grade_impl(f.student, f.subject, 100.0)
                .await
                .is_success()
        );
    }

    #[tokio::test]
    async fn test_add_grade_requires_enrollment_and_subject() {
        let f = fixture().await;
        let outsider = user(&f.storage, "outsider", UserRole::Student).await;
        assert!(matches!(
            f.storage.add_grade_impl(outsider, f.subject, 50.0).await,
            WriteOutcome::Invalid(_)
        ));
        assert_eq!(
            f.storage.add_grade_impl(f.student, 999, 50.0).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_require_section_teacher() {
        let f = fixture().await;
        let other_teacher = user(&f.storage, "other", UserRole::Teacher).await;
        let grade_id = f
            .storage
            .add_grade_impl(f.student, f.subject, 70.0)
            .await
            .created_id()
            .unwrap();

        assert_eq!(
            f.storage.update_grade_impl(grade_id, 80.0, other_teacher).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            f.storage.update_grade_impl(grade_id, 80.0, f.teacher).await,
            WriteOutcome::Updated
        );
        let grades = f.storage.list_student_grades_impl(f.student).await.unwrap();
        assert_eq!(grades[0].grade, 80.0);
        assert_eq!(grades[0].subject_name, "Math");

        assert_eq!(
            f.storage.delete_grade_impl(grade_id, other_teacher).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            f.storage.delete_grade_impl(grade_id, f.teacher).await,
            WriteOutcome::Deleted
        );
        assert_eq!(
            f.storage.delete_grade_impl(grade_id, f.teacher).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_subject_grouping_and_section_grades() {
        let f = fixture().await;
        let science = f
            .storage
            .create_subject_impl("Science", f.section, f.teacher)
            .await
            .created_id()
            .unwrap();
        f.storage.add_grade_impl(f.student, f.subject, 60.0).await;
        f.storage.add_grade_impl(f.student, f.subject, 90.0).await;
        f.storage.add_grade_impl(f.student, science, 75.0).await;

        let grouped = f
            .storage
            .student_subject_grades_impl(f.student)
            .await
            .unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].subject_name, "Math");
        assert_eq!(grouped[0].grades, vec![60.0, 90.0]);
        assert_eq!(grouped[0].average, 75.0);
        assert_eq!((grouped[1].subject_id, grouped[1].grades.clone()), (science, vec![75.0]));

        let section_grades = f.storage.list_section_grades_impl(f.section).await.unwrap();
        assert_eq!(section_grades.len(), 3);
        assert!(section_grades.iter().all(|g| g.username == "stu"));

        // 其他班级看不到这些成绩
        let other_section = section(&f.storage, "B").await;
        assert!(
            f.storage
                .list_section_grades_impl(other_section)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_deleting_subject_cascades_grades() {
        let f = fixture().await;
        f.storage.add_grade_impl(f.student, f.subject, 88.0).await;
        assert_eq!(
            f.storage.delete_subject_impl(f.subject, f.teacher).await,
            WriteOutcome::Deleted
        );
        assert!(
            f.storage
                .list_student_grades_impl(f.student)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_same_subject_name_in_two_sections() {
        let f = fixture().await;
        let other = section(&f.storage, "B").await;
        f.storage
            .assign_to_section_impl(f.teacher, UserRole::Teacher, other)
            .await;
        f.storage
            .assign_to_section_impl(f.student, UserRole::Student, other)
            .await;
        let other_math = f
            .storage
            .create_subject_impl("Math", other, f.teacher)
            .await
            .created_id()
            .unwrap();
        f.storage.add_grade_impl(f.student, f.subject, 100.0).await;
        f.storage.add_grade_impl(f.student, other_math, 40.0).await;

        let grouped = f
            .storage
            .student_subject_grades_impl(f.student)
            .await
            .unwrap();
        assert_eq!(grouped.len(), 2);
        assert!(grouped.iter().all(|s| s.subject_name == "Math"));
        let averages: Vec<_> = grouped.iter().map(|s| (s.subject_id, s.average)).collect();
        assert!(averages.contains(&(f.subject, 100.0)));
        assert!(averages.contains(&(other_math, 40.0)));
    }
}
