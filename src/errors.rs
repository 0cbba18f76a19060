//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 级联删除另有 [`CascadeError`]，携带失败的步骤。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_maat_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum MaatError {
            $($variant(String),)*
        }

        impl MaatError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(MaatError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(MaatError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(MaatError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl MaatError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        MaatError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_maat_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Store Error"),
    Configuration("E005", "Configuration Error"),
    NotFound("E006", "Resource Not Found"),
    Validation("E007", "Validation Error"),
    Serialization("E008", "Serialization Error"),
    FileOperation("E009", "File Operation Error"),
    Authentication("E010", "Authentication Error"),
    Authorization("E011", "Authorization Error"),
    Timeout("E012", "Store Timeout"),
}

/// 存储层可重试的瞬时错误特征（死锁、序列化冲突、SQLite 忙）
const TRANSIENT_MARKERS: &[&str] = &[
    "deadlock",
    "database is locked",
    "database is busy",
    "could not serialize",
    "lock wait timeout",
];

impl MaatError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为值得重试的瞬时存储错误
    pub fn is_transient(&self) -> bool {
        match self {
            MaatError::DatabaseOperation(msg) => {
                let msg = msg.to_lowercase();
                TRANSIENT_MARKERS.iter().any(|marker| msg.contains(marker))
            }
            _ => false,
        }
    }
}

impl fmt::Display for MaatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for MaatError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for MaatError {
    fn from(err: sea_orm::DbErr) -> Self {
        MaatError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for MaatError {
    fn from(err: std::io::Error) -> Self {
        MaatError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for MaatError {
    fn from(err: serde_json::Error) -> Self {
        MaatError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MaatError>;

/// 级联删除的步骤，按执行顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Begin,
    Questions,
    Submissions,
    Roster,
    Assessment,
    Commit,
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CascadeStep::Begin => "begin",
            CascadeStep::Questions => "questions",
            CascadeStep::Submissions => "submissions",
            CascadeStep::Roster => "roster",
            CascadeStep::Assessment => "assessment",
            CascadeStep::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// 级联删除失败：记录失败步骤与底层原因，之后的步骤均未执行
#[derive(Debug, Clone)]
pub struct CascadeError {
    pub step: CascadeStep,
    pub source: MaatError,
}

impl CascadeError {
    pub fn new(step: CascadeStep, source: impl Into<MaatError>) -> Self {
        Self {
            step,
            source: source.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.source.is_transient()
    }
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cascade delete failed at step '{}': {}", self.step, self.source)
    }
}

impl std::error::Error for CascadeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// 超时等不属于具体步骤的失败归入事务边界
impl From<MaatError> for CascadeError {
    fn from(err: MaatError) -> Self {
        CascadeError::new(CascadeStep::Begin, err)
    }
}
