// ==========================================
// 项目成本挣值管理系统 - 承付款领域模型
// ==========================================
// 承付款: 已承诺但尚未发生的成本,按置信度加权
// ==========================================

use crate::config::evm_config::ConfidenceWeights;
use crate::domain::types::{ConfidenceLevel, ObligationStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Obligation - 承付款
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    pub project_id: String,
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub confidence_level: ConfidenceLevel,
    pub status: ObligationStatus,

    /// 承诺日期 (时间轴用; None 视为自项目开始即存在)
    #[serde(default)]
    pub committed_on: Option<NaiveDate>,

    /// 预计转为实际成本的日期
    #[serde(default)]
    pub expected_incur_date: Option<NaiveDate>,
}

impl Obligation {
    /// 是否参与加权汇总
    pub fn is_active(&self) -> bool {
        self.status == ObligationStatus::Active
    }

    /// 置信度百分比 (权重 × 100)
    pub fn confidence_percentage(&self, weights: &ConfidenceWeights) -> f64 {
        weights.weight(self.confidence_level) * 100.0
    }

    /// 加权金额 (金额 × 权重)
    pub fn weighted_amount(&self, weights: &ConfidenceWeights) -> f64 {
        self.amount * weights.weight(self.confidence_level)
    }

    /// 在指定日期是否已承诺
    pub fn committed_by(&self, date: NaiveDate) -> bool {
        self.committed_on.map_or(true, |d| d <= date)
    }
}

// ==========================================
// ObligationItem - 分类明细中的单条记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationItem {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub confidence_level: ConfidenceLevel,
    pub weight: f64,
    pub confidence_percentage: f64,
    pub weighted_amount: f64,
}

// ==========================================
// CategoryObligations - 按成本分类汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryObligations {
    pub count: usize,
    pub total_amount: f64,
    pub weighted_amount: f64,
    pub items: Vec<ObligationItem>,
}

// ==========================================
// ObligationSummary - 置信度加权结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObligationSummary {
    /// 加权承付款合计 (EVM 调整指标使用此值)
    pub total_obligations: f64,

    /// 未加权的生效承付款合计
    pub total_unweighted: f64,

    pub active_count: usize,

    /// 置信度等级 → 未加权金额
    pub by_confidence: BTreeMap<ConfidenceLevel, f64>,

    /// 成本分类 → 汇总
    pub by_category: BTreeMap<String, CategoryObligations>,
}
