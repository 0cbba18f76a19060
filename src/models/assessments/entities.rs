use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::{MaatError, Result};

/// 邮箱集合（阅卷人名单、主持人名单）
///
/// 按字符串精确比较，持久化为有序 JSON 数组，相同集合的编码结果一致。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailSet(BTreeSet<String>);

impl EmailSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(email)
    }

    pub fn insert(&mut self, email: impl Into<String>) -> bool {
        let email = email.into();
        let email = email.trim();
        if email.is_empty() {
            return false;
        }
        self.0.insert(email.to_string())
    }

    pub fn remove(&mut self, email: &str) -> bool {
        self.0.remove(email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// 本集合中有而 `other` 中没有的元素
    pub fn difference(&self, other: &EmailSet) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }

    /// 编码为存储在考核行上的 JSON 数组
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(MaatError::from)
    }

    /// 严格解码 JSON 数组
    pub fn decode(raw: &str) -> Result<Self> {
        let items: Vec<String> = serde_json::from_str(raw)?;
        Ok(items.into_iter().collect())
    }

    /// 宽松解码：旧数据可能是逗号分隔或单个邮箱
    pub fn decode_lossy(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::new();
        }
        match Self::decode(trimmed) {
            Ok(set) => set,
            Err(_) => trimmed.split([',', ';']).collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for EmailSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for email in iter {
            set.insert(email);
        }
        set
    }
}

impl IntoIterator for EmailSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// 考核实体（不含备忘录）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: i64,
    pub module_code: String,
    pub assessment_name: String,
    pub lecturer_email: String,
    pub mod_email: EmailSet,
    pub marker_email: EmailSet,
    pub total_mark: f64,
    pub total_num_submissions: i64,
    pub num_submissions_marked: i64,
    pub assessment_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 考核的缓存计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounts {
    pub total_num_submissions: i64,
    pub num_submissions_marked: i64,
}

/// 名单同步前后的差异
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RosterChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// 满分调整后的分数重算结果
///
/// 每个提交独立更新，单个失败不会阻止其余更新。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RescaleReport {
    pub old_total: f64,
    pub new_total: f64,
    pub updated: usize,
    pub skipped: usize,
    pub failed: Vec<RescaleFailure>,
}

impl RescaleReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescaleFailure {
    pub submission_id: i64,
    pub error: String,
}
