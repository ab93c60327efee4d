use serde::Serialize;
use std::collections::BTreeMap;

// 学生视角的成绩（带科目名）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentGrade {
    pub id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub grade: f64,
    pub assignment_date: chrono::DateTime<chrono::Utc>,
}

// 班级视角的成绩（带学生名与科目名）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGrade {
    pub id: i64,
    pub student_id: i64,
    pub username: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub grade: f64,
    pub assignment_date: chrono::DateTime<chrono::Utc>,
}

// 单科成绩汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub subject_id: i64,
    pub subject_name: String,
    pub grades: Vec<f64>,
    pub average: f64,
}

impl SubjectSummary {
    pub fn new(subject_id: i64, subject_name: String, grades: Vec<f64>) -> Self {
        let average = if grades.is_empty() {
            0.0
        } else {
            grades.iter().sum::<f64>() / grades.len() as f64
        };
        Self {
            subject_id,
            subject_name,
            grades,
            average,
        }
    }

    /// 按科目 ID 分组 `(subject_id, subject_name, grade)`，结果按科目名排序
    pub fn group<I>(grades: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (i64, String, f64)>,
    {
        let mut grouped: BTreeMap<i64, (String, Vec<f64>)> = BTreeMap::new();
        for (subject_id, subject_name, grade) in grades {
            grouped
                .entry(subject_id)
                .or_insert_with(|| (subject_name, Vec::new()))
                .1
                .push(grade);
        }

        let mut summaries: Vec<Self> = grouped
            .into_iter()
            .map(|(subject_id, (subject_name, grades))| Self::new(subject_id, subject_name, grades))
            .collect();
        summaries.sort_by(|a, b| {
            a.subject_name
                .cmp(&b.subject_name)
                .then(a.subject_id.cmp(&b.subject_id))
        });
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_summary_average() {
        let summary = SubjectSummary::new(1, "Math".into(), vec![80.0, 90.0, 100.0]);
        assert_eq!(summary.average, 90.0);
    }

    #[test]
    fn test_subject_summary_empty() {
        let summary = SubjectSummary::new(2, "Art".into(), vec![]);
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn test_group_keeps_same_named_subjects_apart() {
        let summaries = SubjectSummary::group(vec![
            (3, "Math".to_string(), 70.0),
            (1, "Art".to_string(), 95.0),
            (7, "Math".to_string(), 50.0),
            (3, "Math".to_string(), 90.0),
        ]);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].subject_name, "Art");
        assert_eq!((summaries[1].subject_id, summaries[1].average), (3, 80.0));
        assert_eq!((summaries[2].subject_id, summaries[2].grades.clone()), (7, vec![50.0]));
    }
}
