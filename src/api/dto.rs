// ==========================================
// 项目成本挣值管理系统 - EvmApi DTO 定义
// ==========================================
// 职责: 定义 EvmApi 的请求选项和响应结构 (供 Reporter 序列化)
// ==========================================

use crate::domain::evm::EvmResult;
use crate::domain::obligation::ObligationSummary;
use crate::domain::summary::ProjectSummary;
use crate::domain::timeline::EvmTimeline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单时点 EVM 计算选项
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvmOptions {
    /// 承付款是否参与调整指标（默认 true）
    #[serde(default = "default_include_obligations")]
    pub include_obligations: bool,

    /// 人工指定的调整后完工尚需成本（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_etc_adjusted: Option<f64>,
}

fn default_include_obligations() -> bool {
    true
}

impl Default for EvmOptions {
    fn default() -> Self {
        Self {
            include_obligations: true,
            manual_etc_adjusted: None,
        }
    }
}

/// 单项目 EVM 报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmReport {
    pub project_id: String,
    pub project_name: String,

    /// 评估日 (YYYY-MM-DD)
    pub evaluated_on: NaiveDate,

    pub evm: EvmResult,

    /// 承付款加权明细
    pub obligations: ObligationSummary,
}

/// 驾驶舱聚合 (一次读取台账,三类结果)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDashboard {
    pub report: EvmReport,
    pub summary: ProjectSummary,
    pub timeline: EvmTimeline,
}

/// 项目组合 EVM 汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub evaluated_on: NaiveDate,
    pub projects: Vec<EvmReport>,

    pub total_budget: f64,
    pub total_actual_cost: f64,
    pub total_earned_value: f64,

    /// 组合 CPI (ΣEV / ΣAC, ΣAC 为 0 时 1.0)
    pub portfolio_cpi: f64,

    /// 存在超支风险的项目ID
    pub projects_at_risk: Vec<String>,
}
