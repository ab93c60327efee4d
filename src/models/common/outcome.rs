use serde::Serialize;

/// 写操作的结果
///
/// 数据访问层的写操作不向上抛出存储错误：唯一约束冲突映射为
/// `AlreadyExists`，其他数据库故障记录日志后映射为 `Failed`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// 新记录已插入，携带新记录 ID
    Created(i64),
    Updated,
    Deleted,
    /// 违反唯一约束
    AlreadyExists,
    NotFound,
    /// 操作者无权执行该操作
    Forbidden,
    /// 参数校验失败，未写入任何数据
    Invalid(String),
    /// 存储故障
    Failed,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            WriteOutcome::Created(_) | WriteOutcome::Updated | WriteOutcome::Deleted
        )
    }

    pub fn created_id(&self) -> Option<i64> {
        match self {
            WriteOutcome::Created(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_variants() {
        assert!(WriteOutcome::Created(3).is_success());
        assert!(WriteOutcome::Updated.is_success());
        assert!(WriteOutcome::Deleted.is_success());
        assert!(!WriteOutcome::AlreadyExists.is_success());
        assert!(!WriteOutcome::Forbidden.is_success());
        assert!(!WriteOutcome::Invalid("x".into()).is_success());
        assert!(!WriteOutcome::Failed.is_success());
    }

    #[test]
    fn test_created_id() {
        assert_eq!(WriteOutcome::Created(42).created_id(), Some(42));
        assert_eq!(WriteOutcome::Deleted.created_id(), None);
    }
}
