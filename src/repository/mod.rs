// ==========================================
// 项目成本挣值管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供台账快照读取接口,屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod ledger_repo;
pub mod ledger_repo_impl;
pub mod memory_ledger;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use ledger_repo::LedgerReader;
pub use ledger_repo_impl::SqliteLedgerRepository;
pub use memory_ledger::InMemoryLedger;
