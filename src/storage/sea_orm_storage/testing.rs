//! 存储层测试工具：内存 SQLite + 触发器注入故障

use super::{SeaOrmStorage, StorageOptions};
use crate::models::assessments::requests::CreateAssessmentRequest;
use crate::models::submissions::{entities::SubmissionStatus, requests::CreateSubmissionRequest};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use std::time::Duration;

pub(crate) async fn create_storage() -> SeaOrmStorage {
    // 内存库只能有一个连接，否则每个连接各自一份数据
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("unable to create test database");

    Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    SeaOrmStorage::from_connection(
        db,
        StorageOptions {
            operation_timeout: Duration::from_secs(5),
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(1),
        },
    )
}

pub(crate) async fn seed_assessment(
    storage: &SeaOrmStorage,
    total_mark: f64,
    markers: &[&str],
) -> i64 {
    storage
        .create_assessment_impl(
            "lecturer@mandela.ac.za",
            CreateAssessmentRequest {
                lecturer_email: None,
                marker_email: markers.iter().map(|m| m.to_string()).collect(),
                assessment_name: "Practical 1".to_string(),
                module_code: "WRAV301".to_string(),
                memorandum: Some(b"%PDF-1.4 memo".to_vec()),
                mod_email: vec!["moderator@mandela.ac.za".to_string()],
                total_mark,
                assessment_type: "Practical".to_string(),
            },
        )
        .await
        .expect("unable to create assessment")
}

pub(crate) async fn seed_submission(
    storage: &SeaOrmStorage,
    assessment_id: i64,
    status: SubmissionStatus,
    mark: Option<f64>,
) -> i64 {
    let submission_id = storage
        .create_submission_impl(CreateSubmissionRequest {
            assessment_id,
            student_num: format!("s2{:07}", rand::random::<u32>() % 10_000_000),
            student_name: "Thandi".to_string(),
            student_surname: "Nkosi".to_string(),
            submission_pdf: Some(b"%PDF-1.4 answer".to_vec()),
            submission_status: Some(status),
            submission_folder_name: None,
        })
        .await
        .expect("unable to create submission");

    if let Some(mark) = mark {
        storage
            .update_submission_mark_impl(submission_id, mark)
            .await
            .expect("unable to set mark");
    }

    submission_id
}

async fn run_sql(storage: &SeaOrmStorage, sql: &str) {
    storage
        .db
        .execute_unprepared(sql)
        .await
        .expect("unable to run test sql");
}

/// 该提交的任何更新都会失败
pub(crate) async fn fail_updates_of_submission(storage: &SeaOrmStorage, submission_id: i64) {
    run_sql(
        storage,
        &format!(
            "CREATE TRIGGER fail_submission_{submission_id} BEFORE UPDATE ON submissions \
             WHEN OLD.id = {submission_id} BEGIN SELECT RAISE(ABORT, 'injected update failure'); END;"
        ),
    )
    .await;
}

/// 表上的任何删除都会失败
pub(crate) async fn fail_deletes_on(storage: &SeaOrmStorage, table: &str) {
    run_sql(
        storage,
        &format!(
            "CREATE TRIGGER fail_delete_{table} BEFORE DELETE ON {table} \
             BEGIN SELECT RAISE(ABORT, 'injected delete failure'); END;"
        ),
    )
    .await;
}

/// 表上的任何插入都会失败
pub(crate) async fn fail_inserts_on(storage: &SeaOrmStorage, table: &str) {
    run_sql(
        storage,
        &format!(
            "CREATE TRIGGER fail_insert_{table} BEFORE INSERT ON {table} \
             BEGIN SELECT RAISE(ABORT, 'injected insert failure'); END;"
        ),
    )
    .await;
}

/// 临时重命名表，使对它的任何读取都失败
pub(crate) async fn take_table_offline(storage: &SeaOrmStorage, table: &str) {
    run_sql(
        storage,
        &format!("ALTER TABLE {table} RENAME TO {table}_offline"),
    )
    .await;
}

/// 恢复被 take_table_offline 重命名的表
pub(crate) async fn bring_table_online(storage: &SeaOrmStorage, table: &str) {
    run_sql(
        storage,
        &format!("ALTER TABLE {table}_offline RENAME TO {table}"),
    )
    .await;
}
