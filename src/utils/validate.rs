use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid username regex"));

static VIDEO_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("Invalid video url regex"));

pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_MESSAGE_LENGTH: usize = 2000;

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度校验：3 <= x <= 32
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err("Username length must be between 3 and 32 characters");
    }
    // 用户名格式校验：只能包含字母、数字、点、下划线或连字符
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, dots, underscores or hyphens");
    }
    Ok(())
}

/// 密码只要求长度，初始管理员密码也需满足
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    let len = password.chars().count();
    if len < 6 {
        return Err("Password must be at least 6 characters long");
    }
    if len > 128 {
        return Err("Password must be at most 128 characters long");
    }
    Ok(())
}

/// 校验班级、科目、主题、作业标题等名称，返回去除首尾空白后的名称
pub fn validate_name<'a>(field: &str, name: &'a str) -> Result<&'a str, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters long"
        ));
    }
    Ok(trimmed)
}

/// 成绩必须在 [0, 100] 之间
pub fn validate_grade(grade: f64) -> Result<(), &'static str> {
    if !grade.is_finite() || !(0.0..=100.0).contains(&grade) {
        return Err("Grade must be between 0 and 100");
    }
    Ok(())
}

pub fn validate_video_url(url: &str) -> Result<&str, &'static str> {
    let trimmed = url.trim();
    if !VIDEO_URL_RE.is_match(trimmed) {
        return Err("Video URL must be an http(s) link");
    }
    Ok(trimmed)
}

pub fn validate_message(content: &str) -> Result<&str, &'static str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Message must not be empty");
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message is too long");
    }
    Ok(trimmed)
}

/// 规范化上传文件名：去掉路径部分、引号和控制字符，空格替换为下划线并转为小写
pub fn normalize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    base.chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect::<String>()
        .replace(' ', "_")
        .to_lowercase()
}

/// 获取文件扩展名（小写，不含点号）
pub fn file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("john.doe-2").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(validate_name("Topic", "  Algebra  "), Ok("Algebra"));
        assert!(validate_name("Topic", "   ").is_err());
        assert!(validate_name("Topic", &"n".repeat(65)).is_err());
    }

    #[test]
    fn test_grade_range() {
        assert!(validate_grade(0.0).is_ok());
        assert!(validate_grade(100.0).is_ok());
        assert!(validate_grade(87.5).is_ok());
        assert!(validate_grade(-1.0).is_err());
        assert!(validate_grade(100.5).is_err());
        assert!(validate_grade(f64::NAN).is_err());
    }

    #[test]
    fn test_video_url() {
        assert_eq!(
            validate_video_url("  https://youtu.be/abc  "),
            Ok("https://youtu.be/abc")
        );
        assert!(validate_video_url("ftp://example.com/v.mp4").is_err());
        assert!(validate_video_url("not a url").is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(validate_message(" hi "), Ok("hi"));
        assert!(validate_message("   ").is_err());
    }

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("Week 1 Notes.PDF"), "week_1_notes.pdf");
        assert_eq!(normalize_filename("C:\\Users\\me\\Intro Video.mp4"), "intro_video.mp4");
        assert_eq!(normalize_filename("../../etc/passwd"), "passwd");
        assert_eq!(normalize_filename("a\".pdf"), "a.pdf");
        assert_eq!(normalize_filename("re\r\nport.pdf"), "report.pdf");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("lecture.MKV"), Some("mkv".to_string()));
        assert_eq!(file_extension("noext"), None);
    }
}
