// ==========================================
// 项目成本挣值管理系统 - 项目汇总模型
// ==========================================
// 用途: 预算使用、分类/阶段分解、付款时间表 (驾驶舱数据源)
// ==========================================

use crate::domain::cost_entry::CostEntry;
use crate::domain::types::{BudgetStatusIndicator, PhaseStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub id: String,
    pub name: String,
    pub budget_allocated: f64,
    pub amount_spent: f64,
    pub budget_remaining: f64,
    pub utilization_percentage: f64,
    pub status: PhaseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAmount {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAmount {
    /// YYYY-MM
    pub month: String,
    pub amount: f64,
}

// ==========================================
// PaymentTimeline - 未付款条目按到期日分桶
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentTimeline {
    /// 到期日 < 评估日
    pub overdue: Vec<CostEntry>,
    /// 评估日 <= 到期日 <= 评估日 + 30 天
    pub due_within_30_days: Vec<CostEntry>,
    pub later: Vec<CostEntry>,
    /// 未设置到期日
    pub undated: Vec<CostEntry>,
    pub overdue_total: f64,
    pub upcoming_total: f64,
}

// ==========================================
// ProjectSummary - 项目汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub project_name: String,
    pub total_budget: f64,

    pub total_spent: f64,
    pub total_paid: f64,
    pub total_outstanding: f64,

    /// 预算 − 总支出 (含未付款)
    pub budget_remaining_actual: f64,
    /// 预算 − 已付款
    pub budget_remaining_committed: f64,

    pub budget_utilization: f64,
    pub status_indicator: BudgetStatusIndicator,

    pub phases_summary: Vec<PhaseSummary>,
    pub cost_breakdown: BTreeMap<String, f64>,
    pub paid_breakdown: BTreeMap<String, f64>,
    pub outstanding_breakdown: BTreeMap<String, f64>,

    pub trend_data: Vec<DailyAmount>,
    pub monthly_trend: Vec<MonthlyAmount>,
    pub recent_entries: Vec<CostEntry>,
    pub payment_timeline: PaymentTimeline,
}
