// ==========================================
// 项目成本挣值管理系统 - EVM 输入/输出模型
// ==========================================
// EvmResult 为瞬时结果: 每次查询重新计算,不落库
// ==========================================

use crate::domain::project::{CostEstimates, ProjectFinancials};
use crate::domain::types::{BreachSeverity, CostStatus, EarlyWarning, ScheduleStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// EvmInput - 单时点计算输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmInput {
    pub budget_at_completion: f64,
    pub actual_cost: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub today: NaiveDate,
    #[serde(default)]
    pub cost_estimates: Option<CostEstimates>,
    /// 加权承付款合计
    #[serde(default)]
    pub total_obligations: f64,
    /// 人工指定的调整后完工尚需成本
    #[serde(default)]
    pub manual_etc_adjusted: Option<f64>,
    pub include_obligations: bool,
}

impl EvmInput {
    /// 由项目财务包构造; 承付款合计由调用方先行加权
    pub fn from_financials(
        financials: &ProjectFinancials,
        today: NaiveDate,
        total_obligations: f64,
    ) -> Self {
        Self {
            budget_at_completion: financials.budget_at_completion,
            actual_cost: financials.actual_cost,
            start_date: financials.start_date,
            end_date: financials.end_date,
            today,
            cost_estimates: financials.cost_estimates.clone(),
            total_obligations,
            manual_etc_adjusted: None,
            include_obligations: true,
        }
    }

    pub fn with_manual_etc_adjusted(mut self, etc: f64) -> Self {
        self.manual_etc_adjusted = Some(etc);
        self
    }

    pub fn with_include_obligations(mut self, include: bool) -> Self {
        self.include_obligations = include;
        self
    }
}

// ==========================================
// EvmMeasurements - 已知 PV/EV 时的公式输入
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvmMeasurements {
    pub budget_at_completion: f64,
    pub actual_cost: f64,
    pub planned_value: f64,
    pub earned_value: f64,
    pub total_obligations: f64,
    pub manual_etc_adjusted: Option<f64>,
    pub include_obligations: bool,
}

// ==========================================
// EvmResult - EVM 计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmResult {
    // ===== 输入回显 =====
    pub budget_at_completion: f64,
    pub actual_cost: f64,
    /// 实际参与调整指标的承付款 (include_obligations=false 时为 0)
    pub total_obligations: f64,
    /// 进度比例 (0~1)
    pub progress: f64,

    // ===== 标准指标 =====
    pub planned_value: f64,
    pub earned_value: f64,
    pub cost_variance: f64,
    pub schedule_variance: f64,
    pub cost_performance_index: f64,
    pub schedule_performance_index: f64,
    pub estimate_at_completion: f64,
    pub variance_at_completion: f64,
    pub estimate_to_complete: f64,

    // ===== 承付款调整指标 =====
    pub cost_performance_index_adj: f64,
    pub cost_variance_adj: f64,
    pub estimate_to_complete_adj: f64,
    pub estimate_at_completion_adj: f64,
    pub variance_at_completion_adj: f64,

    // ===== 状态标签 =====
    pub cost_status: CostStatus,
    pub cost_status_adj: CostStatus,
    pub schedule_status: ScheduleStatus,

    // ===== 风险 =====
    pub budget_breach_risk: bool,
    /// 超支百分比 (未超支时为 0)
    pub breach_percent: f64,
    pub breach_severity: BreachSeverity,
    pub early_warnings: Vec<EarlyWarning>,
}

impl EvmResult {
    pub fn has_warning(&self, warning: EarlyWarning) -> bool {
        self.early_warnings.contains(&warning)
    }
}
