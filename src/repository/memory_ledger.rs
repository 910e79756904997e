// ==========================================
// 项目成本挣值管理系统 - 内存台账
// ==========================================
// 用途: 调用方已持有快照时直接注入 (测试/演示/嵌入式场景)
// ==========================================

use crate::domain::project::LedgerSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ledger_repo::LedgerReader;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct InMemoryLedger {
    snapshots: RwLock<HashMap<String, LedgerSnapshot>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_snapshots(snapshots: impl IntoIterator<Item = LedgerSnapshot>) -> Self {
        let map = snapshots
            .into_iter()
            .map(|s| (s.project.id.clone(), s))
            .collect();
        Self {
            snapshots: RwLock::new(map),
        }
    }

    /// 写入或覆盖项目快照
    pub fn upsert(&self, snapshot: LedgerSnapshot) -> RepositoryResult<()> {
        let mut guard = self
            .snapshots
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        guard.insert(snapshot.project.id.clone(), snapshot);
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn load_snapshot(&self, project_id: &str) -> RepositoryResult<Option<LedgerSnapshot>> {
        let guard = self
            .snapshots
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(guard.get(project_id).cloned())
    }

    async fn list_project_ids(&self) -> RepositoryResult<Vec<String>> {
        let guard = self
            .snapshots
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut ids: Vec<String> = guard.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
