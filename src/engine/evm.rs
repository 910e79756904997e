// ==========================================
// 项目成本挣值管理系统 - 核心 EVM 计算引擎
// ==========================================
// 职责: 单时点挣值分析 (标准 + 承付款调整两套指标)
// 输入: EvmInput (预算/实际成本/工期/评估日/估算/承付款)
// 输出: EvmResult (偏差/指数/预测/状态/超支/预警)
// 红线: 纯函数,评估日由调用方注入; 零分母取中性比率 1.0
// ==========================================

use crate::config::evm_config::{EarnedValueParams, EvmConfig};
use crate::domain::evm::{EvmInput, EvmMeasurements, EvmResult};
use crate::domain::project::estimated_total;
use crate::domain::types::{BreachSeverity, CostStatus, EarlyWarning, ScheduleStatus};
use crate::engine::error::{ensure_amount, EngineResult};
use chrono::NaiveDate;
use tracing::instrument;

// ==========================================
// EvmCalculator - 核心 EVM 计算器
// ==========================================
pub struct EvmCalculator {
    config: EvmConfig,
}

impl EvmCalculator {
    /// 构造函数
    ///
    /// # 参数
    /// - `config`: 已校验的 EVM 参数
    pub fn new(config: EvmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 单时点 EVM 计算
    ///
    /// 先由工期与评估日推导进度/PV/EV,再走统一公式集
    ///
    /// # 返回
    /// - Ok(EvmResult): 完整指标
    /// - Err(InvalidInput): 预算/成本/承付款/估算为负数或非有限值
    #[instrument(skip(self, input), fields(bac = input.budget_at_completion, today = %input.today))]
    pub fn calculate(&self, input: &EvmInput) -> EngineResult<EvmResult> {
        validate_input(input)?;

        let progress = progress_ratio(input.start_date, input.end_date, input.today);
        let planned_value = input.budget_at_completion * progress;
        let earned_value = estimate_earned_value(
            input.budget_at_completion,
            progress,
            input.actual_cost,
            input.total_obligations,
            estimated_total(input.cost_estimates.as_ref()),
            &self.config.earned_value,
        );

        let measurements = EvmMeasurements {
            budget_at_completion: input.budget_at_completion,
            actual_cost: input.actual_cost,
            planned_value,
            earned_value,
            total_obligations: input.total_obligations,
            manual_etc_adjusted: input.manual_etc_adjusted,
            include_obligations: input.include_obligations,
        };

        let mut result = self.evaluate(&measurements)?;
        result.progress = progress;
        Ok(result)
    }

    /// 已知 PV/EV 时的公式集
    ///
    /// # 说明
    /// - progress 回显为 PV/BAC (BAC 为 0 时为 0)
    /// - include_obligations=false 时承付款不参与任何调整指标
    pub fn evaluate(&self, m: &EvmMeasurements) -> EngineResult<EvmResult> {
        validate_measurements(m)?;

        let bac = m.budget_at_completion;
        let ac = m.actual_cost;
        let pv = m.planned_value;
        let ev = m.earned_value.min(bac);

        // ===== 标准指标 =====
        let cost_variance = ev - ac;
        let schedule_variance = ev - pv;
        let cpi = safe_ratio(ev, ac);
        let spi = safe_ratio(ev, pv);

        let eac = if cpi > 0.0 { bac / cpi } else { bac };
        let vac = bac - eac;
        let etc = eac - ac;

        // ===== 承付款调整指标 =====
        let obligations = if m.include_obligations {
            m.total_obligations
        } else {
            0.0
        };
        let committed = ac + obligations;
        let cpi_adj = safe_ratio(ev, committed);
        let cv_adj = ev - committed;

        let (etc_adj, eac_adj) = match m.manual_etc_adjusted {
            Some(manual) => (manual, committed + manual),
            None if obligations == 0.0 => (etc, eac),
            None => {
                let etc_adj = self.adjusted_etc(bac, ev, cpi_adj);
                (etc_adj, (committed + etc_adj).max(eac))
            }
        };
        let vac_adj = bac - eac_adj;

        // ===== 风险 =====
        let budget_breach_risk = eac_adj > bac;
        let breach_percent = if budget_breach_risk {
            (safe_ratio(eac_adj, bac) - 1.0) * 100.0
        } else {
            0.0
        };
        let breach_severity = self.classify_breach(budget_breach_risk, breach_percent);
        let early_warnings = self.collect_warnings(bac, cpi_adj, eac_adj, breach_severity);

        Ok(EvmResult {
            budget_at_completion: bac,
            actual_cost: ac,
            total_obligations: obligations,
            progress: if bac > 0.0 { (pv / bac).clamp(0.0, 1.0) } else { 0.0 },
            planned_value: pv,
            earned_value: ev,
            cost_variance,
            schedule_variance,
            cost_performance_index: cpi,
            schedule_performance_index: spi,
            estimate_at_completion: eac,
            variance_at_completion: vac,
            estimate_to_complete: etc,
            cost_performance_index_adj: cpi_adj,
            cost_variance_adj: cv_adj,
            estimate_to_complete_adj: etc_adj,
            estimate_at_completion_adj: eac_adj,
            variance_at_completion_adj: vac_adj,
            cost_status: self.classify_cost_status(cpi),
            cost_status_adj: self.classify_adjusted_cost_status(cpi_adj),
            schedule_status: self.classify_schedule_status(spi),
            budget_breach_risk,
            breach_percent,
            breach_severity,
            early_warnings,
        })
    }

    // ==========================================
    // 预测与分类
    // ==========================================

    /// 调整后完工尚需成本
    ///
    /// CPI_adj 在 (0, 1) 内按效率放大剩余工作; 否则乘保守系数
    fn adjusted_etc(&self, bac: f64, ev: f64, cpi_adj: f64) -> f64 {
        let base_remaining = (bac - ev).max(0.0);
        if cpi_adj > 0.0 && cpi_adj < 1.0 {
            base_remaining / cpi_adj
        } else {
            base_remaining * self.config.forecast.etc_buffer
        }
    }

    pub fn classify_cost_status(&self, cpi: f64) -> CostStatus {
        let s = &self.config.status;
        if cpi > s.upper {
            CostStatus::UnderBudget
        } else if cpi < s.lower {
            CostStatus::OverBudget
        } else {
            CostStatus::OnBudget
        }
    }

    /// 调整后成本状态 (超支下限更严格)
    pub fn classify_adjusted_cost_status(&self, cpi_adj: f64) -> CostStatus {
        let s = &self.config.status;
        if cpi_adj > s.upper {
            CostStatus::UnderBudget
        } else if cpi_adj < s.adjusted_lower {
            CostStatus::OverBudget
        } else {
            CostStatus::OnBudget
        }
    }

    pub fn classify_schedule_status(&self, spi: f64) -> ScheduleStatus {
        let s = &self.config.status;
        if spi > s.upper {
            ScheduleStatus::Ahead
        } else if spi < s.lower {
            ScheduleStatus::Behind
        } else {
            ScheduleStatus::OnSchedule
        }
    }

    pub fn classify_breach(&self, breach_risk: bool, breach_percent: f64) -> BreachSeverity {
        let b = &self.config.breach;
        if !breach_risk {
            BreachSeverity::None
        } else if breach_percent >= b.high_pct {
            BreachSeverity::High
        } else if breach_percent >= b.medium_pct {
            BreachSeverity::Medium
        } else {
            BreachSeverity::Low
        }
    }

    fn collect_warnings(
        &self,
        bac: f64,
        cpi_adj: f64,
        eac_adj: f64,
        severity: BreachSeverity,
    ) -> Vec<EarlyWarning> {
        let f = &self.config.forecast;
        let mut warnings = Vec::new();

        if cpi_adj < f.cost_control_cpi {
            warnings.push(EarlyWarning::CostControlAlert);
        }
        if eac_adj > bac * f.formal_change_eac_ratio {
            warnings.push(EarlyWarning::FormalChangeReview);
        }
        if severity == BreachSeverity::High {
            warnings.push(EarlyWarning::StakeholderNotification);
        }

        warnings
    }
}

impl Default for EvmCalculator {
    fn default() -> Self {
        Self::new(EvmConfig::default())
    }
}

// ==========================================
// 共享公式
// ==========================================

/// 零分母保护的比率 (分母 <= 0 时返回 1.0)
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        1.0
    }
}

/// 时间进度比例 (0~1); 工期无效 (end <= start) 时为 0
pub fn progress_ratio(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> f64 {
    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return 0.0;
    }
    let elapsed = (today - start).num_days() as f64;
    (elapsed / total_days as f64).clamp(0.0, 1.0)
}

/// 挣值估算 (单时点计算与时间轴共用同一公式)
///
/// # 参数
/// - `bac`: 完工预算
/// - `progress`: 时间进度 (0~1)
/// - `actual_cost`: 累计实际成本
/// - `total_obligations`: 加权承付款 (原始值,不受 include 开关影响)
/// - `estimated_total`: 明细估算合计 (None 表示无明细估算)
///
/// # 返回
/// EV,恒不超过 BAC
pub fn estimate_earned_value(
    bac: f64,
    progress: f64,
    actual_cost: f64,
    total_obligations: f64,
    estimated_total: Option<f64>,
    params: &EarnedValueParams,
) -> f64 {
    let ev = match estimated_total {
        Some(total) if total > 0.0 => {
            let cost_progress = ((actual_cost + total_obligations) / total).min(1.0);
            let blend = params.cost_progress_weight * cost_progress
                + params.schedule_progress_weight * progress;
            blend.min(1.0) * bac
        }
        _ => params.default_ev_ratio * bac * progress,
    };
    ev.min(bac)
}

// ==========================================
// 输入校验
// ==========================================

fn validate_input(input: &EvmInput) -> EngineResult<()> {
    ensure_amount("budget_at_completion", input.budget_at_completion)?;
    ensure_amount("actual_cost", input.actual_cost)?;
    ensure_amount("total_obligations", input.total_obligations)?;
    if let Some(manual) = input.manual_etc_adjusted {
        ensure_amount("manual_etc_adjusted", manual)?;
    }
    if let Some(estimates) = &input.cost_estimates {
        for (name, value) in estimates {
            ensure_amount(&format!("cost_estimates[{}]", name), *value)?;
        }
    }
    Ok(())
}

fn validate_measurements(m: &EvmMeasurements) -> EngineResult<()> {
    ensure_amount("budget_at_completion", m.budget_at_completion)?;
    ensure_amount("actual_cost", m.actual_cost)?;
    ensure_amount("planned_value", m.planned_value)?;
    ensure_amount("earned_value", m.earned_value)?;
    ensure_amount("total_obligations", m.total_obligations)?;
    if let Some(manual) = m.manual_etc_adjusted {
        ensure_amount("manual_etc_adjusted", manual)?;
    }
    Ok(())
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::CostEstimates;
    use crate::engine::error::EvmError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn measurements(bac: f64, ac: f64, ev: f64, pv: f64) -> EvmMeasurements {
        EvmMeasurements {
            budget_at_completion: bac,
            actual_cost: ac,
            planned_value: pv,
            earned_value: ev,
            total_obligations: 0.0,
            manual_etc_adjusted: None,
            include_obligations: true,
        }
    }

    fn input(bac: f64, ac: f64) -> EvmInput {
        EvmInput {
            budget_at_completion: bac,
            actual_cost: ac,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            today: date(2024, 7, 1),
            cost_estimates: None,
            total_obligations: 0.0,
            manual_etc_adjusted: None,
            include_obligations: true,
        }
    }

    #[test]
    fn test_standard_scenario_over_budget_and_behind() {
        let calc = EvmCalculator::default();
        let r = calc
            .evaluate(&measurements(1_000_000.0, 500_000.0, 450_000.0, 500_000.0))
            .unwrap();

        assert!((r.cost_variance + 50_000.0).abs() < 1e-6);
        assert!((r.schedule_variance + 50_000.0).abs() < 1e-6);
        assert!((r.cost_performance_index - 0.9).abs() < 1e-9);
        assert!((r.schedule_performance_index - 0.9).abs() < 1e-9);
        assert!((r.estimate_at_completion - 1_111_111.11).abs() < 0.01);
        assert_eq!(r.cost_status, CostStatus::OverBudget);
        assert_eq!(r.schedule_status, ScheduleStatus::Behind);
    }

    #[test]
    fn test_zero_actual_cost_gives_neutral_cpi() {
        let r = EvmCalculator::default()
            .evaluate(&measurements(100_000.0, 0.0, 10_000.0, 0.0))
            .unwrap();
        assert_eq!(r.cost_performance_index, 1.0);
        assert_eq!(r.schedule_performance_index, 1.0);
        assert_eq!(r.estimate_at_completion, 100_000.0);
    }

    #[test]
    fn test_no_obligations_mirrors_standard_forecast() {
        let r = EvmCalculator::default()
            .evaluate(&measurements(100_000.0, 60_000.0, 50_000.0, 55_000.0))
            .unwrap();

        assert_eq!(r.total_obligations, 0.0);
        assert_eq!(r.cost_performance_index_adj, r.cost_performance_index);
        assert_eq!(r.estimate_at_completion_adj, r.estimate_at_completion);
        assert_eq!(r.estimate_to_complete_adj, r.estimate_to_complete);
        assert_eq!(r.budget_breach_risk, r.estimate_at_completion > 100_000.0);
    }

    #[test]
    fn test_adjusted_cost_status_and_cost_control_alert() {
        let mut m = measurements(100_000.0, 40_000.0, 42_500.0, 45_000.0);
        m.total_obligations = 10_000.0;

        let r = EvmCalculator::default().evaluate(&m).unwrap();

        assert!((r.cost_performance_index_adj - 0.85).abs() < 1e-9);
        assert_eq!(r.cost_status_adj, CostStatus::OverBudget);
        assert!(r.has_warning(EarlyWarning::CostControlAlert));
        assert!(r.estimate_at_completion_adj >= r.estimate_at_completion);
    }

    #[test]
    fn test_exclude_obligations_flag() {
        let mut m = measurements(100_000.0, 40_000.0, 42_500.0, 45_000.0);
        m.total_obligations = 10_000.0;
        m.include_obligations = false;

        let r = EvmCalculator::default().evaluate(&m).unwrap();
        assert_eq!(r.total_obligations, 0.0);
        assert_eq!(r.cost_performance_index_adj, r.cost_performance_index);
    }

    #[test]
    fn test_manual_etc_is_taken_verbatim() {
        let mut m = measurements(100_000.0, 40_000.0, 42_500.0, 45_000.0);
        m.total_obligations = 10_000.0;
        m.manual_etc_adjusted = Some(30_000.0);

        let r = EvmCalculator::default().evaluate(&m).unwrap();
        assert_eq!(r.estimate_to_complete_adj, 30_000.0);
        assert_eq!(r.estimate_at_completion_adj, 80_000.0);
        assert_eq!(r.variance_at_completion_adj, 20_000.0);
        assert!(!r.budget_breach_risk);
        assert_eq!(r.breach_severity, BreachSeverity::None);
    }

    #[test]
    fn test_etc_buffer_when_adjusted_cpi_at_least_one() {
        // EV 60k, AC 40k, O 10k → CPI_adj 1.2 → 剩余 40k × 1.1
        let mut m = measurements(100_000.0, 40_000.0, 60_000.0, 50_000.0);
        m.total_obligations = 10_000.0;

        let r = EvmCalculator::default().evaluate(&m).unwrap();
        assert!((r.estimate_to_complete_adj - 44_000.0).abs() < 1e-6);
        assert!((r.estimate_at_completion_adj - 94_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_breach_severity_bands() {
        let calc = EvmCalculator::default();
        assert_eq!(calc.classify_breach(false, 0.0), BreachSeverity::None);
        assert_eq!(calc.classify_breach(true, 2.0), BreachSeverity::Low);
        assert_eq!(calc.classify_breach(true, 5.0), BreachSeverity::Medium);
        assert_eq!(calc.classify_breach(true, 10.0), BreachSeverity::High);
    }

    #[test]
    fn test_progress_ratio_clamps_and_handles_degenerate_schedule() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 11);
        assert_eq!(progress_ratio(start, end, date(2023, 12, 1)), 0.0);
        assert_eq!(progress_ratio(start, end, date(2024, 1, 6)), 0.5);
        assert_eq!(progress_ratio(start, end, date(2025, 1, 1)), 1.0);
        assert_eq!(progress_ratio(end, start, date(2024, 1, 6)), 0.0);
        assert_eq!(progress_ratio(start, start, start), 0.0);
    }

    #[test]
    fn test_earned_value_without_estimates_is_eighty_percent_of_pv() {
        let r = EvmCalculator::default().calculate(&input(120_000.0, 50_000.0)).unwrap();
        assert!((r.earned_value - 0.8 * r.planned_value).abs() < 1e-6);
        assert!(r.progress > 0.49 && r.progress < 0.51);
    }

    #[test]
    fn test_earned_value_blend_with_estimates() {
        let mut estimates = CostEstimates::new();
        estimates.insert("Build".to_string(), 80_000.0);
        estimates.insert("Test".to_string(), 20_000.0);

        let mut i = input(100_000.0, 50_000.0);
        i.start_date = date(2024, 1, 1);
        i.end_date = date(2024, 1, 11);
        i.today = date(2024, 1, 6);
        i.cost_estimates = Some(estimates);

        // 0.4 × 0.5 + 0.6 × 0.5 = 0.5
        let r = EvmCalculator::default().calculate(&i).unwrap();
        assert!((r.earned_value - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_earned_value_capped_at_budget() {
        let ev = estimate_earned_value(
            100_000.0,
            1.0,
            500_000.0,
            0.0,
            Some(10.0),
            &EarnedValueParams::default(),
        );
        assert_eq!(ev, 100_000.0);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let calc = EvmCalculator::default();
        assert!(matches!(calc.calculate(&input(-1.0, 0.0)), Err(EvmError::InvalidInput(_))));
        assert!(calc.calculate(&input(1.0, f64::NAN)).is_err());

        let mut i = input(100.0, 0.0);
        i.total_obligations = -5.0;
        assert!(calc.calculate(&i).is_err());

        let mut estimates = CostEstimates::new();
        estimates.insert("Bad".to_string(), -1.0);
        let mut i = input(100.0, 0.0);
        i.cost_estimates = Some(estimates);
        assert!(calc.calculate(&i).is_err());
    }

    #[test]
    fn test_zero_budget_does_not_divide_by_zero() {
        let r = EvmCalculator::default().calculate(&input(0.0, 100.0)).unwrap();
        assert_eq!(r.planned_value, 0.0);
        assert_eq!(r.earned_value, 0.0);
        assert_eq!(r.schedule_performance_index, 1.0);
        assert!(r.breach_percent.is_finite());
    }
}
