// ==========================================
// 项目成本挣值管理系统 - 时间轴投影模型
// ==========================================

use crate::domain::types::{BreachSeverity, CostEfficiency, TrendDirection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// TimelinePoint - 月度网格点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month_index: u32,
    /// 月份标签 YYYY-MM
    pub month: String,
    pub date: NaiveDate,

    pub planned_value: f64,
    pub earned_value: f64,
    pub actual_cost: f64,
    pub total_obligations: f64,
    pub actual_plus_obligations: f64,

    pub cost_variance: f64,
    pub schedule_variance: f64,

    pub eac_standard: f64,
    pub eac_adjusted: f64,
    pub cpi_standard: f64,
    pub cpi_adjusted: f64,
    pub spi: f64,

    pub budget_breach_risk: bool,
    pub breach_severity: BreachSeverity,

    /// true = 晚于评估日的预测点
    pub is_forecast: bool,
}

/// 图表序列点 (标签, 数值)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month: String,
    pub value: f64,
}

// ==========================================
// OverrunPoint - 首次超支月份
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrunPoint {
    pub month: String,
    pub eac: f64,
    pub budget_exceeded_by: f64,
    pub is_forecast: bool,
}

// ==========================================
// TrendAnalysis - CPI 趋势
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// 仅 Deteriorating 时为 Medium/High
    pub severity: Option<BreachSeverity>,
    /// 窗口首点 CPI − 末点 CPI (正数表示下降)
    pub cpi_change: f64,
    pub window: Vec<f64>,
}

// ==========================================
// CurrentPerformance - 评估日表现
// ==========================================
// 与单时点 EVM 计算同源,二者严格一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPerformance {
    pub current_cpi: f64,
    pub current_spi: f64,
    pub current_cpi_adjusted: f64,
    pub final_eac: f64,
    pub final_eac_adjusted: f64,
    /// EAC − BAC (可为负)
    pub projected_overrun: f64,
}

// ==========================================
// CompletionPrediction - 完工预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPrediction {
    pub current_progress_pct: f64,
    pub projected_completion_cost: f64,
    pub projected_overrun_pct: f64,
    pub months_remaining: u32,
    pub cost_efficiency: CostEfficiency,
}

// ==========================================
// EvmTimeline - 时间轴投影结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmTimeline {
    pub budget_at_completion: f64,
    pub evaluated_on: NaiveDate,
    pub duration_months: u32,
    pub uses_s_curve: bool,

    pub points: Vec<TimelinePoint>,
    pub cost_baseline: Vec<SeriesPoint>,
    pub eac_trend: Vec<SeriesPoint>,

    pub current_performance: CurrentPerformance,
    pub overrun_point: Option<OverrunPoint>,
    pub trend: TrendAnalysis,
    pub completion_prediction: CompletionPrediction,
}

impl EvmTimeline {
    pub fn historical_points(&self) -> impl Iterator<Item = &TimelinePoint> {
        self.points.iter().filter(|p| !p.is_forecast)
    }

    pub fn forecast_points(&self) -> impl Iterator<Item = &TimelinePoint> {
        self.points.iter().filter(|p| p.is_forecast)
    }
}
