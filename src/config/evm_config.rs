// ==========================================
// 项目成本挣值管理系统 - EVM 参数配置
// ==========================================
// 职责: 集中管理权重、阈值、时间轴参数
// 默认值即标准口径; 覆写来源见 ConfigManager
// ==========================================

use crate::domain::types::ConfidenceLevel;
use crate::engine::error::{EvmError, EngineResult};
use serde::{Deserialize, Serialize};

/// 置信度权重表
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl ConfidenceWeights {
    pub fn weight(&self, level: ConfidenceLevel) -> f64 {
        match level {
            ConfidenceLevel::High => self.high,
            ConfidenceLevel::Medium => self.medium,
            ConfidenceLevel::Low => self.low,
        }
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            high: ConfidenceLevel::High.default_weight(),
            medium: ConfidenceLevel::Medium.default_weight(),
            low: ConfidenceLevel::Low.default_weight(),
        }
    }
}

/// 挣值估算参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarnedValueParams {
    /// 成本进度权重 (有明细估算时)
    pub cost_progress_weight: f64,
    /// 进度权重 (有明细估算时)
    pub schedule_progress_weight: f64,
    /// 无明细估算时 EV = PV × 该系数
    pub default_ev_ratio: f64,
}

impl Default for EarnedValueParams {
    fn default() -> Self {
        Self {
            cost_progress_weight: 0.4,
            schedule_progress_weight: 0.6,
            default_ev_ratio: 0.8,
        }
    }
}

/// 状态标签阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    /// 指数 > upper → Under Budget / Ahead
    pub upper: f64,
    /// 指数 < lower → Over Budget / Behind
    pub lower: f64,
    /// 调整后 CPI < adjusted_lower → Over Budget
    pub adjusted_lower: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            upper: 1.05,
            lower: 0.95,
            adjusted_lower: 0.90,
        }
    }
}

/// 超支严重度阈值 (百分比)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreachThresholds {
    pub high_pct: f64,
    pub medium_pct: f64,
}

impl Default for BreachThresholds {
    fn default() -> Self {
        Self {
            high_pct: 10.0,
            medium_pct: 5.0,
        }
    }
}

/// 预警与预测参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    /// CPI_adj < 该值 → COST_CONTROL_ALERT
    pub cost_control_cpi: f64,
    /// EAC_adj > BAC × 该值 → FORMAL_CHANGE_REVIEW
    pub formal_change_eac_ratio: f64,
    /// CPI_adj >= 1 时剩余工作的保守系数
    pub etc_buffer: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            cost_control_cpi: 0.90,
            formal_change_eac_ratio: 1.10,
            etc_buffer: 1.10,
        }
    }
}

/// 时间轴参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineParams {
    pub days_per_month: f64,
    /// 项目未结束时在计划完工后追加的月数
    pub lookahead_months: u32,
    /// 预测点每月 EAC 不确定性膨胀率
    pub uncertainty_per_month: f64,
    /// EAC > BAC × (1 + 该值) 视为超支点
    pub overrun_threshold: f64,
    pub trend_window: usize,
    pub trend_medium_drop: f64,
    pub trend_high_drop: f64,
    pub efficiency_good_cpi: f64,
    pub efficiency_poor_cpi: f64,
}

impl Default for TimelineParams {
    fn default() -> Self {
        Self {
            days_per_month: 30.44,
            lookahead_months: 3,
            uncertainty_per_month: 0.02,
            overrun_threshold: 0.05,
            trend_window: 3,
            trend_medium_drop: 0.05,
            trend_high_drop: 0.10,
            efficiency_good_cpi: 0.95,
            efficiency_poor_cpi: 0.85,
        }
    }
}

// ==========================================
// EvmConfig - 全量配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvmConfig {
    pub confidence: ConfidenceWeights,
    pub earned_value: EarnedValueParams,
    pub status: StatusThresholds,
    pub breach: BreachThresholds,
    pub forecast: ForecastParams,
    pub timeline: TimelineParams,
}

impl EvmConfig {
    /// 校验配置合法性
    pub fn validate(&self) -> EngineResult<()> {
        for level in ConfidenceLevel::all() {
            let w = self.confidence.weight(level);
            check(
                w.is_finite() && w > 0.0 && w <= 1.0,
                &format!("confidence.{}", level),
                "权重必须在 (0, 1] 范围内",
            )?;
        }

        let ev = &self.earned_value;
        check(
            ev.cost_progress_weight >= 0.0 && ev.schedule_progress_weight >= 0.0,
            "earned_value",
            "混合权重不能为负",
        )?;
        check(
            (ev.cost_progress_weight + ev.schedule_progress_weight - 1.0).abs() < 1e-9,
            "earned_value",
            "成本权重与进度权重之和必须为 1",
        )?;
        check(
            ev.default_ev_ratio > 0.0 && ev.default_ev_ratio <= 1.0,
            "earned_value.default_ev_ratio",
            "必须在 (0, 1] 范围内",
        )?;

        let s = &self.status;
        check(
            s.adjusted_lower > 0.0 && s.adjusted_lower <= s.lower && s.lower <= s.upper,
            "status",
            "阈值须满足 0 < adjusted_lower <= lower <= upper",
        )?;

        let b = &self.breach;
        check(
            b.medium_pct >= 0.0 && b.medium_pct <= b.high_pct,
            "breach",
            "阈值须满足 0 <= medium_pct <= high_pct",
        )?;

        let f = &self.forecast;
        check(f.cost_control_cpi > 0.0, "forecast.cost_control_cpi", "必须大于 0")?;
        check(
            f.formal_change_eac_ratio >= 1.0,
            "forecast.formal_change_eac_ratio",
            "不能小于 1",
        )?;
        check(f.etc_buffer >= 1.0, "forecast.etc_buffer", "不能小于 1")?;

        let t = &self.timeline;
        check(t.days_per_month > 0.0, "timeline.days_per_month", "必须大于 0")?;
        check(t.uncertainty_per_month >= 0.0, "timeline.uncertainty_per_month", "不能为负")?;
        check(t.overrun_threshold >= 0.0, "timeline.overrun_threshold", "不能为负")?;
        check(t.trend_window >= 2, "timeline.trend_window", "至少需要 2 个点")?;
        check(
            t.trend_medium_drop <= t.trend_high_drop,
            "timeline.trend",
            "trend_medium_drop 不能大于 trend_high_drop",
        )?;
        check(
            t.efficiency_poor_cpi <= t.efficiency_good_cpi,
            "timeline.efficiency",
            "efficiency_poor_cpi 不能大于 efficiency_good_cpi",
        )?;

        Ok(())
    }
}

fn check(ok: bool, key: &str, message: &str) -> EngineResult<()> {
    if ok {
        Ok(())
    } else {
        Err(EvmError::InvalidConfig {
            key: key.to_string(),
            message: message.to_string(),
        })
    }
}
