use serde::{Deserialize, Serialize};

// 用户角色（数据库中存储为 "Student" / "Teacher" / "Admin"）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum UserRole {
    Student, // 学生
    Teacher, // 教师
    Admin,   // 管理员
}

impl UserRole {
    pub const STUDENT: &'static str = "Student";
    pub const TEACHER: &'static str = "Teacher";
    pub const ADMIN: &'static str = "Admin";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher]
    }
    pub fn student_roles() -> &'static [&'static UserRole] {
        &[&Self::Student]
    }
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Admin]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => UserRole::STUDENT,
            UserRole::Teacher => UserRole::TEACHER,
            UserRole::Admin => UserRole::ADMIN,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: Student, Teacher, Admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    // 角色比较不区分大小写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "teacher" => Ok(UserRole::Teacher),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 用户简要信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

// 用户及其所属班级（未分配班级的用户 section_name 为空）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithSection {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub section_name: Option<String>,
}

// 按角色分组的用户班级总览
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsersWithSections {
    pub students: Vec<UserWithSection>,
    pub teachers: Vec<UserWithSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("student".parse::<UserRole>(), Ok(UserRole::Student));
        assert_eq!("TEACHER".parse::<UserRole>(), Ok(UserRole::Teacher));
        assert_eq!("Admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!("principal".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_display_matches_storage_form() {
        assert_eq!(UserRole::Student.to_string(), "Student");
        assert_eq!(UserRole::Teacher.to_string(), "Teacher");
        assert_eq!(UserRole::Admin.to_string(), "Admin");
    }

    #[test]
    fn test_role_deserialize() {
        let role: UserRole = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, UserRole::Teacher);
        assert!(serde_json::from_str::<UserRole>("\"guest\"").is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "secret".into(),
            role: UserRole::Student,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"role\":\"Student\""));
    }
}
