use serde::{Deserialize, Serialize};

// 提交状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SubmissionStatus {
    Unmarked,   // 未批改
    InProgress, // 批改中
    Marked,     // 已批改，计入 NumSubmissionsMarked
    Moderated,  // 已审核
}

impl SubmissionStatus {
    pub const UNMARKED: &'static str = "Unmarked";
    pub const IN_PROGRESS: &'static str = "InProgress";
    pub const MARKED: &'static str = "Marked";
    pub const MODERATED: &'static str = "Moderated";

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Unmarked => Self::UNMARKED,
            SubmissionStatus::InProgress => Self::IN_PROGRESS,
            SubmissionStatus::Marked => Self::MARKED,
            SubmissionStatus::Moderated => Self::MODERATED,
        }
    }

    pub fn is_marked(&self) -> bool {
        *self == SubmissionStatus::Marked
    }

    /// 状态变化是否进出 Marked，决定是否需要刷新考核计数
    pub fn crosses_marked_boundary(from: SubmissionStatus, to: SubmissionStatus) -> bool {
        from.is_marked() != to.is_marked()
    }
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid submission status: '{s}'. Supported: Unmarked, InProgress, Marked, Moderated"
            ))
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::UNMARKED => Ok(SubmissionStatus::Unmarked),
            Self::IN_PROGRESS | "In Progress" => Ok(SubmissionStatus::InProgress),
            Self::MARKED => Ok(SubmissionStatus::Marked),
            Self::MODERATED => Ok(SubmissionStatus::Moderated),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

// 提交实体（不含 PDF）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub assessment_id: i64,
    pub student_num: String,
    pub student_name: String,
    pub student_surname: String,
    pub submission_status: SubmissionStatus,
    // 百分制分数
    pub submission_mark: Option<f64>,
    pub submission_folder_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            SubmissionStatus::Unmarked,
            SubmissionStatus::InProgress,
            SubmissionStatus::Marked,
            SubmissionStatus::Moderated,
        ] {
            assert_eq!(status.to_string().parse::<SubmissionStatus>(), Ok(status));
        }
        assert!("marked".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_marked_boundary() {
        use SubmissionStatus::*;
        assert!(SubmissionStatus::crosses_marked_boundary(Unmarked, Marked));
        assert!(SubmissionStatus::crosses_marked_boundary(Marked, Moderated));
        assert!(!SubmissionStatus::crosses_marked_boundary(Unmarked, InProgress));
        assert!(!SubmissionStatus::crosses_marked_boundary(Marked, Marked));
    }

    #[test]
    fn test_status_deserialize_error_message() {
        let err = serde_json::from_str::<SubmissionStatus>(r#""Done""#).unwrap_err();
        assert!(err.to_string().contains("Invalid submission status"));
    }
}
