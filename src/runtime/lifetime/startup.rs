use crate::cache::{ObjectCache, create_object_cache};
use crate::errors::Result;
use crate::models::markers::entities::{MarkerRole, MarkingStyle};
use crate::models::markers::requests::NewMarker;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何阅卷人，则创建一个 Admin 账号
pub async fn seed_admin(storage: &Arc<dyn Storage>, password: Option<String>) -> Result<bool> {
    let count = storage.count_markers().await?;
    if count > 0 {
        debug!(
            "Database already has {} marker(s), skipping admin seed",
            count
        );
        return Ok(false);
    }
    info!("No markers found in database, creating default admin account...");

    // 获取密码：优先使用传入值，否则生成随机密码
    let password = password.unwrap_or_else(|| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let admin = NewMarker {
        marker_email: DEFAULT_ADMIN_EMAIL.to_string(),
        name: "System".to_string(),
        surname: "Administrator".to_string(),
        password_hash: hash_password(&password)?,
        marker_role: MarkerRole::Admin,
        marking_style: MarkingStyle::TickPerMark,
    };

    let marker = storage.create_marker(admin).await?;
    info!(
        "Default admin account created successfully ({})",
        marker.marker_email
    );
    Ok(true)
}

/// 准备服务器启动的上下文
/// 包括存储（含迁移）、默认管理员与缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    // 管理员初始化失败不阻止启动
    if let Err(e) = seed_admin(&storage, std::env::var("ADMIN_PASSWORD").ok()).await {
        warn!("Failed to seed admin account: {}", e);
    }

    let cache = create_object_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
