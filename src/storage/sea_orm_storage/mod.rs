//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 多步操作（名单同步、计数刷新、级联删除）各自在一个事务内完成，
//! 对外接口统一加上超时、瞬时错误重试和按考核加锁。

mod aggregates;
mod assessments;
mod cascade;
mod locks;
mod markers;
mod modules;
mod questions;
mod rescale;
mod roster;
mod submissions;

#[cfg(test)]
pub(crate) mod testing;

pub use locks::AssessmentLocks;
pub use rescale::rescale_mark;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{CascadeError, MaatError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// 存储操作的超时与重试参数
#[derive(Debug, Clone, Copy)]
pub struct StorageOptions {
    pub operation_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

impl StorageOptions {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// 可判断是否值得重试的错误
pub(crate) trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for MaatError {
    fn is_transient(&self) -> bool {
        MaatError::is_transient(self)
    }
}

impl Transient for CascadeError {
    fn is_transient(&self) -> bool {
        CascadeError::is_transient(self)
    }
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    pub(crate) options: StorageOptions,
    pub(crate) locks: AssessmentLocks,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| MaatError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self::from_connection(
            db,
            StorageOptions::from_config(&config.database),
        ))
    }

    /// 使用已有连接创建存储（连接由调用方负责迁移）
    pub fn from_connection(db: DatabaseConnection, options: StorageOptions) -> Self {
        Self {
            db,
            options,
            locks: AssessmentLocks::default(),
        }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| MaatError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| MaatError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| MaatError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(MaatError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 单次操作加超时，超时视为失败而不是无限等待
    pub(crate) async fn timed<T, E, Fut>(&self, op: &str, fut: Fut) -> std::result::Result<T, E>
    where
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<MaatError>,
    {
        match tokio::time::timeout(self.options.operation_timeout, fut).await {
            Ok(outcome) => outcome,
            Err(_) => Err(MaatError::timeout(format!(
                "{op} 超过 {}ms 未完成",
                self.options.operation_timeout.as_millis()
            ))
            .into()),
        }
    }

    /// 带超时的事务性操作，瞬时错误按指数退避重试
    pub(crate) async fn guarded<T, E, F, Fut>(
        &self,
        op: &str,
        mut attempt: F,
    ) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<MaatError> + Transient + std::fmt::Display,
    {
        let mut backoff = self.options.retry_backoff;
        let mut tries = 0u32;
        loop {
            tries += 1;
            match self.timed(op, attempt()).await {
                Err(e) if e.is_transient() && tries < self.options.retry_attempts => {
                    warn!(
                        "{} 遇到瞬时错误（第 {} 次），{}ms 后重试: {}",
                        op,
                        tries,
                        backoff.as_millis(),
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                outcome => return outcome,
            }
        }
    }
}

// Storage trait 实现
use crate::models::{
    assessments::{
        entities::{AggregateCounts, Assessment, EmailSet, RescaleReport, RosterChange},
        requests::{CreateAssessmentRequest, UpdateAssessmentRequest},
    },
    markers::{
        entities::{Marker, MarkerRole},
        requests::{NewMarker, UpdateMarkerRequest},
    },
    modules::{entities::Module, requests::CreateModuleRequest},
    questions::entities::QuestionMark,
    submissions::{
        entities::{Submission, SubmissionStatus},
        requests::{CreateSubmissionRequest, UpdateSubmissionRequest},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 考核模块
    async fn create_assessment(
        &self,
        lecturer_email: &str,
        req: CreateAssessmentRequest,
    ) -> Result<i64> {
        self.guarded("create_assessment", || {
            self.create_assessment_impl(lecturer_email, req.clone())
        })
        .await
    }

    async fn update_assessment(
        &self,
        assessment_id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<RescaleReport>> {
        let update = &update;
        self.guarded("update_assessment", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.update_assessment_impl(assessment_id, update.clone())
                .await
        })
        .await
    }

    async fn update_assessment_total_mark(
        &self,
        assessment_id: i64,
        new_total: f64,
    ) -> Result<RescaleReport> {
        self.guarded("update_assessment_total_mark", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.update_assessment_total_mark_impl(assessment_id, new_total)
                .await
        })
        .await
    }

    async fn delete_assessment(
        &self,
        assessment_id: i64,
    ) -> std::result::Result<bool, CascadeError> {
        let deleted = self
            .guarded("delete_assessment", move || async move {
                let _guard = self.locks.acquire(assessment_id).await;
                self.delete_assessment_impl(assessment_id).await
            })
            .await?;
        if deleted {
            self.locks.forget(assessment_id);
        }
        Ok(deleted)
    }

    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>> {
        self.timed(
            "get_assessment_by_id",
            self.get_assessment_by_id_impl(assessment_id),
        )
        .await
    }

    async fn list_assessments_for_marker(&self, marker_email: &str) -> Result<Vec<Assessment>> {
        self.timed(
            "list_assessments_for_marker",
            self.list_assessments_for_marker_impl(marker_email),
        )
        .await
    }

    async fn list_all_assessments(&self) -> Result<Vec<Assessment>> {
        self.timed("list_all_assessments", self.list_all_assessments_impl())
            .await
    }

    async fn get_memorandum(&self, assessment_id: i64) -> Result<Option<Vec<u8>>> {
        self.timed("get_memorandum", self.get_memorandum_impl(assessment_id))
            .await
    }

    // 名单与计数
    async fn reconcile_roster(
        &self,
        assessment_id: i64,
        desired: &EmailSet,
    ) -> Result<RosterChange> {
        self.guarded("reconcile_roster", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.reconcile_roster_impl(assessment_id, desired).await
        })
        .await
    }

    async fn list_roster(&self, assessment_id: i64) -> Result<EmailSet> {
        self.timed("list_roster", self.list_roster_impl(assessment_id))
            .await
    }

    async fn recalculate_aggregates(&self, assessment_id: i64) -> Result<AggregateCounts> {
        self.guarded("recalculate_aggregates", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.recalculate_aggregates_impl(assessment_id).await
        })
        .await
    }

    // 提交模块
    async fn create_submission(&self, req: CreateSubmissionRequest) -> Result<i64> {
        let req = &req;
        self.guarded("create_submission", move || async move {
            let _guard = self.locks.acquire(req.assessment_id).await;
            self.create_submission_impl(req.clone()).await
        })
        .await
    }

    async fn update_submission(
        &self,
        submission_id: i64,
        update: UpdateSubmissionRequest,
    ) -> Result<()> {
        let assessment_id = self.submission_assessment_id(submission_id).await?;
        let update = &update;
        self.guarded("update_submission", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.update_submission_impl(submission_id, update.clone())
                .await
        })
        .await
    }

    async fn update_submission_status(
        &self,
        submission_id: i64,
        status: SubmissionStatus,
    ) -> Result<()> {
        let assessment_id = self.submission_assessment_id(submission_id).await?;
        self.guarded("update_submission_status", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.update_submission_status_impl(submission_id, status)
                .await
        })
        .await
    }

    async fn update_submission_mark(&self, submission_id: i64, mark: f64) -> Result<()> {
        let assessment_id = self.submission_assessment_id(submission_id).await?;
        self.guarded("update_submission_mark", move || async move {
            let _guard = self.locks.acquire(assessment_id).await;
            self.update_submission_mark_impl(submission_id, mark).await
        })
        .await
    }

    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>> {
        self.timed(
            "get_submission_by_id",
            self.get_submission_by_id_impl(submission_id),
        )
        .await
    }

    async fn list_submissions(&self, assessment_id: i64) -> Result<Vec<Submission>> {
        self.timed("list_submissions", self.list_submissions_impl(assessment_id))
            .await
    }

    async fn get_submission_pdf(&self, submission_id: i64) -> Result<Option<Vec<u8>>> {
        self.timed(
            "get_submission_pdf",
            self.get_submission_pdf_impl(submission_id),
        )
        .await
    }

    async fn get_marked_submission_pdf(&self, submission_id: i64) -> Result<Option<Vec<u8>>> {
        self.timed(
            "get_marked_submission_pdf",
            self.get_marked_submission_pdf_impl(submission_id),
        )
        .await
    }

    async fn upload_marked_submission(&self, submission_id: i64, pdf: Vec<u8>) -> Result<()> {
        self.timed(
            "upload_marked_submission",
            self.upload_marked_submission_impl(submission_id, pdf),
        )
        .await
    }

    // 逐题评分模块
    async fn list_question_marks(&self, submission_id: i64) -> Result<Vec<QuestionMark>> {
        self.timed(
            "list_question_marks",
            self.list_question_marks_impl(submission_id),
        )
        .await
    }

    async fn set_question_mark(
        &self,
        submission_id: i64,
        question_text: &str,
        mark_allocation: f64,
    ) -> Result<QuestionMark> {
        self.guarded("set_question_mark", || {
            self.set_question_mark_impl(submission_id, question_text, mark_allocation)
        })
        .await
    }

    // 阅卷人模块
    async fn create_marker(&self, marker: NewMarker) -> Result<Marker> {
        self.timed("create_marker", self.create_marker_impl(marker))
            .await
    }

    async fn get_marker_by_email(&self, marker_email: &str) -> Result<Option<Marker>> {
        self.timed(
            "get_marker_by_email",
            self.get_marker_by_email_impl(marker_email),
        )
        .await
    }

    async fn list_markers(&self, roles: &[MarkerRole]) -> Result<Vec<Marker>> {
        self.timed("list_markers", self.list_markers_impl(roles))
            .await
    }

    async fn update_marker(
        &self,
        marker_email: &str,
        update: UpdateMarkerRequest,
    ) -> Result<Option<Marker>> {
        self.timed(
            "update_marker",
            self.update_marker_impl(marker_email, update),
        )
        .await
    }

    async fn delete_marker(&self, marker_email: &str) -> Result<bool> {
        // 名单中含该阅卷人的考核全部加锁，按 ID 升序避免死锁
        let affected = self.marker_assessment_ids(marker_email).await?;
        let affected = &affected;
        self.guarded("delete_marker", move || async move {
            let mut guards = Vec::with_capacity(affected.len());
            for id in affected {
                guards.push(self.locks.acquire(*id).await);
            }
            self.delete_marker_impl(marker_email).await
        })
        .await
    }

    async fn count_markers(&self) -> Result<u64> {
        self.timed("count_markers", self.count_markers_impl()).await
    }

    // 课程模块
    async fn create_module(&self, module: CreateModuleRequest) -> Result<Module> {
        self.timed("create_module", self.create_module_impl(module))
            .await
    }

    async fn get_module_by_code(&self, module_code: &str) -> Result<Option<Module>> {
        self.timed(
            "get_module_by_code",
            self.get_module_by_code_impl(module_code),
        )
        .await
    }

    async fn list_modules(&self) -> Result<Vec<Module>> {
        self.timed("list_modules", self.list_modules_impl()).await
    }

    async fn update_module(
        &self,
        module_code: &str,
        module_name: &str,
    ) -> Result<Option<Module>> {
        self.timed(
            "update_module",
            self.update_module_impl(module_code, module_name),
        )
        .await
    }

    async fn delete_module(&self, module_code: &str) -> Result<bool> {
        self.timed("delete_module", self.delete_module_impl(module_code))
            .await
    }
}
