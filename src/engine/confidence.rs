// ==========================================
// 项目成本挣值管理系统 - 置信度加权引擎
// ==========================================
// 职责: 承付款 → 风险调整后的承付成本合计 + 分类/等级分解
// 输入: 承付款列表 (金额 + 置信度 + 状态)
// 输出: ObligationSummary
// 红线: 只统计 Active; 负金额报错; 权重来自 EvmConfig
// ==========================================

use crate::config::evm_config::ConfidenceWeights;
use crate::domain::obligation::{CategoryObligations, Obligation, ObligationItem, ObligationSummary};
use crate::engine::error::{ensure_amount, EngineResult};
use chrono::NaiveDate;
use tracing::instrument;

// ==========================================
// ConfidenceWeightingEngine - 置信度加权引擎
// ==========================================
pub struct ConfidenceWeightingEngine {
    weights: ConfidenceWeights,
}

impl ConfidenceWeightingEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - `weights`: 置信度权重表
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ConfidenceWeights {
        &self.weights
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 汇总承付款
    ///
    /// # 返回
    /// - Ok(ObligationSummary): 加权合计 + 等级/分类分解
    /// - Err(InvalidInput): 存在负数或非法金额
    #[instrument(skip(self, obligations), fields(count = obligations.len()))]
    pub fn summarize(&self, obligations: &[Obligation]) -> EngineResult<ObligationSummary> {
        validate_amounts(obligations)?;

        let mut summary = ObligationSummary::default();

        for obligation in obligations.iter().filter(|o| o.is_active()) {
            let weight = self.weights.weight(obligation.confidence_level);
            let weighted = obligation.weighted_amount(&self.weights);

            summary.total_obligations += weighted;
            summary.total_unweighted += obligation.amount;
            summary.active_count += 1;

            *summary
                .by_confidence
                .entry(obligation.confidence_level)
                .or_insert(0.0) += obligation.amount;

            let category: &mut CategoryObligations = summary
                .by_category
                .entry(obligation.category_name.clone())
                .or_default();
            category.count += 1;
            category.total_amount += obligation.amount;
            category.weighted_amount += weighted;
            category.items.push(ObligationItem {
                id: obligation.id.clone(),
                description: obligation.description.clone(),
                amount: obligation.amount,
                confidence_level: obligation.confidence_level,
                weight,
                confidence_percentage: obligation.confidence_percentage(&self.weights),
                weighted_amount: weighted,
            });
        }

        tracing::debug!(
            total_obligations = summary.total_obligations,
            active_count = summary.active_count,
            "承付款加权完成"
        );

        Ok(summary)
    }

    /// 校验全部承付款金额 (含尚未承诺的)
    pub fn validate(&self, obligations: &[Obligation]) -> EngineResult<()> {
        validate_amounts(obligations)
    }

    /// 加权承付款合计
    pub fn weighted_total(&self, obligations: &[Obligation]) -> EngineResult<f64> {
        validate_amounts(obligations)?;
        Ok(self.sum_weighted(obligations.iter().filter(|o| o.is_active())))
    }

    /// 截至指定日期已承诺的加权承付款合计 (时间轴历史点使用)
    ///
    /// 未填写承诺日期的承付款视为自项目开始即存在
    pub fn weighted_total_as_of(
        &self,
        obligations: &[Obligation],
        date: NaiveDate,
    ) -> EngineResult<f64> {
        validate_amounts(obligations)?;
        Ok(self.sum_weighted(
            obligations
                .iter()
                .filter(|o| o.is_active() && o.committed_by(date)),
        ))
    }

    fn sum_weighted<'a>(&self, obligations: impl Iterator<Item = &'a Obligation>) -> f64 {
        obligations.fold(0.0, |acc, o| acc + o.weighted_amount(&self.weights))
    }
}

impl Default for ConfidenceWeightingEngine {
    fn default() -> Self {
        Self::new(ConfidenceWeights::default())
    }
}

fn validate_amounts(obligations: &[Obligation]) -> EngineResult<()> {
    for obligation in obligations {
        ensure_amount(&format!("obligation[{}].amount", obligation.id), obligation.amount)?;
    }
    Ok(())
}
