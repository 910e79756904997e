// ==========================================
// 项目成本挣值管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 项目成本跟踪 + 挣值分析 (EVM) 计算引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 台账读取
pub mod repository;

// 引擎层 - 挣值计算
pub mod engine;

// 导入层 - CSV 台账
pub mod importer;

// 配置层 - EVM 参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BreachSeverity, ConfidenceLevel, CostEntryStatus, CostStatus, EarlyWarning, ObligationStatus,
    ScheduleStatus,
};

// 领域实体
pub use domain::{
    CostEntry, EvmInput, EvmResult, EvmTimeline, LedgerSnapshot, Obligation, ObligationSummary,
    Phase, Project, ProjectFinancials, ProjectSummary, TimelinePoint,
};

// 引擎
pub use engine::{
    ConfidenceWeightingEngine, EvmCalculator, EvmError, ProjectSummaryEngine, TimelineProjector,
};

// 配置
pub use config::{ConfigManager, EvmConfig};

// 仓储
pub use repository::{InMemoryLedger, LedgerReader, SqliteLedgerRepository};

// API
pub use api::{ApiError, EvmApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "项目成本挣值管理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
