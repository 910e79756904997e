// ==========================================
// 项目成本挣值管理系统 - 台账读取 Trait
// ==========================================
// 职责: 定义引擎输入快照的读取接口（不包含业务逻辑）
// 实现者: InMemoryLedger / SqliteLedgerRepository
// ==========================================

use crate::domain::project::LedgerSnapshot;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// LedgerReader Trait
// ==========================================
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// 读取项目台账快照
    ///
    /// # 返回
    /// - Ok(Some(LedgerSnapshot)): 项目及其阶段/成本条目/承付款
    /// - Ok(None): 项目不存在
    /// - Err: 存储错误或行数据非法
    async fn load_snapshot(&self, project_id: &str) -> RepositoryResult<Option<LedgerSnapshot>>;

    /// 列出全部项目ID (按ID排序)
    async fn list_project_ids(&self) -> RepositoryResult<Vec<String>>;
}
