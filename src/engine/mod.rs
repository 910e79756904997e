// ==========================================
// 项目成本挣值管理系统 - 引擎层
// ==========================================
// 职责: 无状态计算引擎 (纯函数: 快照进,结果出)
// 红线: 引擎不做 I/O, 不拼 SQL, 评估日由调用方注入
// ==========================================

pub mod confidence;
pub mod error;
pub mod evm;
pub mod summary;
pub mod timeline;

// 重导出核心引擎
pub use confidence::ConfidenceWeightingEngine;
pub use error::{EngineResult, EvmError};
pub use evm::{estimate_earned_value, progress_ratio, safe_ratio, EvmCalculator};
pub use summary::ProjectSummaryEngine;
pub use timeline::TimelineProjector;
