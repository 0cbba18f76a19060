use serde::{Deserialize, Serialize};

// 阅卷人角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    Lecturer, // 讲师
    Demi,     // 助教
    Admin,    // 管理员
}

impl MarkerRole {
    pub const LECTURER: &'static str = "Lecturer";
    pub const DEMI: &'static str = "Demi";
    pub const ADMIN: &'static str = "Admin";

    pub fn admin_roles() -> &'static [&'static MarkerRole] {
        &[&Self::Admin]
    }
    pub fn lecturer_roles() -> &'static [&'static MarkerRole] {
        &[&Self::Lecturer, &Self::Admin]
    }
    pub fn all_roles() -> &'static [&'static MarkerRole] {
        &[&Self::Lecturer, &Self::Demi, &Self::Admin]
    }

    /// 可担任讲师/主持人的角色
    pub fn can_moderate(&self) -> bool {
        *self != MarkerRole::Demi
    }
}

impl<'de> Deserialize<'de> for MarkerRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid marker role: '{s}'. Supported: Lecturer, Demi, Admin"
            ))
        })
    }
}

impl std::fmt::Display for MarkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerRole::Lecturer => write!(f, "{}", MarkerRole::LECTURER),
            MarkerRole::Demi => write!(f, "{}", MarkerRole::DEMI),
            MarkerRole::Admin => write!(f, "{}", MarkerRole::ADMIN),
        }
    }
}

impl std::str::FromStr for MarkerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MarkerRole::LECTURER => Ok(MarkerRole::Lecturer),
            MarkerRole::DEMI => Ok(MarkerRole::Demi),
            MarkerRole::ADMIN => Ok(MarkerRole::Admin),
            _ => Err(format!("Invalid marker role: {s}")),
        }
    }
}

// 批改方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarkingStyle {
    TickPerMark,     // 逐勾计分
    QuestionPerMark, // 逐题计分
}

impl std::fmt::Display for MarkingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkingStyle::TickPerMark => write!(f, "TickPerMark"),
            MarkingStyle::QuestionPerMark => write!(f, "QuestionPerMark"),
        }
    }
}

impl std::str::FromStr for MarkingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TickPerMark" => Ok(MarkingStyle::TickPerMark),
            "QuestionPerMark" => Ok(MarkingStyle::QuestionPerMark),
            _ => Err(format!("Invalid marking style: {s}")),
        }
    }
}

// 阅卷人实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub marker_email: String,
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub marker_role: MarkerRole,
    pub marking_style: MarkingStyle,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Demi".parse::<MarkerRole>(), Ok(MarkerRole::Demi));
        assert!("demi".parse::<MarkerRole>().is_err());
        assert!(!MarkerRole::Demi.can_moderate());
        assert!(MarkerRole::Lecturer.can_moderate());
    }

    #[test]
    fn test_marker_hides_password_hash() {
        let marker = Marker {
            marker_email: "l@x.ac.za".into(),
            name: "Lee".into(),
            surname: "Moyo".into(),
            password_hash: "$argon2id$secret".into(),
            marker_role: MarkerRole::Lecturer,
            marking_style: MarkingStyle::QuestionPerMark,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&marker).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"marker_role\":\"Lecturer\""));
    }
}
