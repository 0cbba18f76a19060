//! 对象缓存
//!
//! 目前用于认证中间件缓存阅卷人信息，值统一序列化为 JSON 字符串。

pub mod object_cache;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

pub use object_cache::moka::MokaCacheWrapper;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// 带类型的读写，序列化失败视为未命中
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> CacheResult<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
            Ok(value) => CacheResult::Found(value),
            Err(_) => {
                cache.remove(key).await;
                CacheResult::ExistsButNoValue
            }
        },
        CacheResult::NotFound => CacheResult::NotFound,
        CacheResult::ExistsButNoValue => CacheResult::ExistsButNoValue,
    }
}

pub async fn insert_json<T: Serialize>(cache: &dyn ObjectCache, key: String, value: &T, ttl: u64) {
    if let Ok(json) = serde_json::to_string(value) {
        cache.insert_raw(key, json, ttl).await;
    }
}

/// 阅卷人信息的缓存键
pub fn marker_cache_key(marker_email: &str) -> String {
    format!("marker:{marker_email}")
}

pub async fn create_object_cache() -> crate::errors::Result<Arc<dyn ObjectCache>> {
    let cache = MokaCacheWrapper::new()?;
    Ok(Arc::new(cache))
}
