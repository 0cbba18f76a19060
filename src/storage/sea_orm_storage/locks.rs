//! 按考核加锁

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 进程内按考核 ID 串行化多步写操作；跨进程仍为后写覆盖
#[derive(Debug, Clone, Default)]
pub struct AssessmentLocks {
    inner: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl AssessmentLocks {
    /// 获取考核锁，持有期间同一考核的其他写操作等待
    pub async fn acquire(&self, assessment_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .entry(assessment_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// 考核删除后回收锁，仍有等待者时保留
    pub fn forget(&self, assessment_id: i64) {
        self.inner
            .remove_if(&assessment_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
