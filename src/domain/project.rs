// ==========================================
// 项目成本挣值管理系统 - 项目领域模型
// ==========================================
// Project/Phase 为台账事实; ProjectFinancials 为引擎输入快照
// ==========================================

use crate::domain::cost_entry::{cumulative_actual_cost, CostEntry};
use crate::domain::obligation::Obligation;
use crate::domain::types::{PhaseStatus, ProjectStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 工作包名称 → 估算成本
pub type CostEstimates = BTreeMap<String, f64>;

// ==========================================
// Project - 项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub total_budget: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,

    /// 明细估算 (None 与空表等价: 无明细估算)
    #[serde(default)]
    pub cost_estimates: Option<CostEstimates>,
}

impl Project {
    /// 计划工期是否有效 (end > start)
    pub fn has_valid_schedule(&self) -> bool {
        self.end_date > self.start_date
    }
}

// ==========================================
// Phase - 项目阶段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub budget_allocation: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PhaseStatus,
}

// ==========================================
// LedgerSnapshot - 台账快照
// ==========================================
// 台账一次性提供的只读事实集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub project: Project,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub cost_entries: Vec<CostEntry>,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
}

impl LedgerSnapshot {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            phases: Vec::new(),
            cost_entries: Vec::new(),
            obligations: Vec::new(),
        }
    }
}

// ==========================================
// ProjectFinancials - 引擎输入包
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFinancials {
    pub budget_at_completion: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cost_estimates: Option<CostEstimates>,
    pub actual_cost: f64,
    pub obligations: Vec<Obligation>,
}

impl ProjectFinancials {
    /// 从台账快照构造
    ///
    /// AC 与承付款均截至 as_of(含): 承诺日期晚于 as_of 的承付款不计入
    pub fn from_snapshot(snapshot: &LedgerSnapshot, as_of: NaiveDate) -> Self {
        Self {
            budget_at_completion: snapshot.project.total_budget,
            start_date: snapshot.project.start_date,
            end_date: snapshot.project.end_date,
            cost_estimates: snapshot.project.cost_estimates.clone(),
            actual_cost: cumulative_actual_cost(&snapshot.cost_entries, as_of),
            obligations: snapshot
                .obligations
                .iter()
                .filter(|o| o.committed_by(as_of))
                .cloned()
                .collect(),
        }
    }
}

/// 明细估算合计 (无估算或合计 <= 0 时返回 None)
pub fn estimated_total(estimates: Option<&CostEstimates>) -> Option<f64> {
    let total = estimates?.values().fold(0.0, |acc, v| acc + v);
    if total > 0.0 {
        Some(total)
    } else {
        None
    }
}
