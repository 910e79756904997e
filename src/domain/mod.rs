// ==========================================
// 项目成本挣值管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、引擎输入/输出记录
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod cost_entry;
pub mod evm;
pub mod obligation;
pub mod project;
pub mod summary;
pub mod timeline;
pub mod types;

// 重导出核心类型
pub use cost_entry::{cumulative_actual_cost, CostEntry, CostEntryDraft};
pub use evm::{EvmInput, EvmMeasurements, EvmResult};
pub use obligation::{CategoryObligations, Obligation, ObligationItem, ObligationSummary};
pub use project::{CostEstimates, LedgerSnapshot, Phase, Project, ProjectFinancials};
pub use summary::{DailyAmount, MonthlyAmount, PaymentTimeline, PhaseSummary, ProjectSummary};
pub use timeline::{
    CompletionPrediction, CurrentPerformance, EvmTimeline, OverrunPoint, SeriesPoint,
    TimelinePoint, TrendAnalysis,
};
pub use types::{
    BreachSeverity, BudgetStatusIndicator, ConfidenceLevel, CostEfficiency, CostEntryStatus,
    CostStatus, EarlyWarning, ObligationStatus, PhaseStatus, ProjectStatus, ScheduleStatus,
    TrendDirection,
};
