// ==========================================
// 项目成本挣值管理系统 - 时间轴投影引擎
// ==========================================
// 职责: 按月网格重复执行核心 EVM 计算
// 输入: 台账快照 + 评估日
// 输出: EvmTimeline (基线 / 历史 / 预测 / 趋势 / 完工预测)
// 红线: 挣值公式与单时点计算共用; 评估日表现与单时点结果严格一致
// ==========================================

use crate::config::evm_config::{EvmConfig, TimelineParams};
use crate::domain::cost_entry::cumulative_actual_cost;
use crate::domain::evm::{EvmInput, EvmResult};
use crate::domain::project::{estimated_total, LedgerSnapshot, Project};
use crate::domain::timeline::{
    CompletionPrediction, CurrentPerformance, EvmTimeline, OverrunPoint, SeriesPoint,
    TimelinePoint, TrendAnalysis,
};
use crate::domain::types::{BreachSeverity, CostEfficiency, TrendDirection};
use crate::engine::confidence::ConfidenceWeightingEngine;
use crate::engine::error::{ensure_amount, EngineResult, EvmError};
use crate::engine::evm::{safe_ratio, EvmCalculator};
use chrono::{Months, NaiveDate};
use tracing::instrument;

// ==========================================
// TimelineProjector - 时间轴投影引擎
// ==========================================
pub struct TimelineProjector {
    calculator: EvmCalculator,
    weighting: ConfidenceWeightingEngine,
    params: TimelineParams,
}

/// 评估日锚点 (预测点的起算基准)
struct Anchor<'a> {
    current: &'a EvmResult,
    baseline_pv: f64,
}

impl TimelineProjector {
    /// 构造函数
    ///
    /// # 参数
    /// - `config`: 已校验的 EVM 参数 (计算器与加权引擎共用)
    pub fn new(config: EvmConfig) -> Self {
        Self {
            calculator: EvmCalculator::new(config),
            weighting: ConfidenceWeightingEngine::new(config.confidence),
            params: config.timeline,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成月度时间轴
    ///
    /// # 参数
    /// - `snapshot`: 台账快照 (项目 + 成本条目 + 承付款)
    /// - `today`: 评估日 (早于等于该日为历史点,之后为预测点)
    ///
    /// # 返回
    /// - Ok(EvmTimeline)
    /// - Err(InvalidInput): 金额非法或日期越界
    #[instrument(skip(self, snapshot), fields(project_id = %snapshot.project.id, today = %today))]
    pub fn project(
        &self,
        snapshot: &LedgerSnapshot,
        today: NaiveDate,
    ) -> EngineResult<EvmTimeline> {
        let project = &snapshot.project;
        let bac = project.total_budget;
        ensure_amount("total_budget", bac)?;
        for entry in &snapshot.cost_entries {
            ensure_amount(&format!("cost_entry[{}].amount", entry.id), entry.amount)?;
        }

        let duration_months = self.duration_months(project.start_date, project.end_date);
        let uses_s_curve = estimated_total(project.cost_estimates.as_ref()).is_some();
        let horizon = if today < project.end_date {
            duration_months + self.params.lookahead_months
        } else {
            duration_months
        };

        // 1. 评估日表现 (与单时点计算同一调用)
        let current_obligations = self
            .weighting
            .weighted_total_as_of(&snapshot.obligations, today)?;
        let current = self.calculator.calculate(&self.input_at(
            project,
            today,
            cumulative_actual_cost(&snapshot.cost_entries, today),
            current_obligations,
        ))?;

        // 2. 月度网格
        let mut points = Vec::with_capacity(horizon as usize + 1);
        let mut anchor_pv = 0.0;
        let mut previous_date = project.start_date;
        let mut months_ahead = 0u32;

        for month_index in 0..=horizon {
            let date = project
                .start_date
                .checked_add_months(Months::new(month_index))
                .ok_or_else(|| {
                    EvmError::InvalidInput(format!(
                        "时间轴日期越界: {} + {} 个月",
                        project.start_date, month_index
                    ))
                })?;
            let baseline_pv =
                bac * self.baseline_fraction(month_index as f64, duration_months, uses_s_curve);

            let point = if date <= today {
                self.historical_point(snapshot, month_index, date, baseline_pv)?
            } else {
                if months_ahead == 0 && month_index > 0 {
                    // 锚点取评估日的基线 PV (在前后两个网格日之间按天插值)
                    let span = (date - previous_date).num_days().max(1) as f64;
                    let elapsed = (today - previous_date).num_days() as f64;
                    let position = (month_index - 1) as f64 + elapsed / span;
                    anchor_pv =
                        bac * self.baseline_fraction(position, duration_months, uses_s_curve);
                }
                months_ahead += 1;
                let anchor = Anchor {
                    current: &current,
                    baseline_pv: anchor_pv,
                };
                self.forecast_point(&anchor, month_index, date, baseline_pv, months_ahead)
            };
            points.push(point);
            previous_date = date;
        }

        // 3. 派生分析
        let cost_baseline = points
            .iter()
            .map(|p| SeriesPoint {
                month: p.month.clone(),
                value: p.planned_value,
            })
            .collect();
        let eac_trend = points
            .iter()
            .map(|p| SeriesPoint {
                month: p.month.clone(),
                value: p.eac_adjusted,
            })
            .collect();

        let overrun_point = self.find_overrun_point(&points, bac);
        let trend = self.analyze_trend(&points);
        let current_performance = CurrentPerformance {
            current_cpi: current.cost_performance_index,
            current_spi: current.schedule_performance_index,
            current_cpi_adjusted: current.cost_performance_index_adj,
            final_eac: current.estimate_at_completion,
            final_eac_adjusted: current.estimate_at_completion_adj,
            projected_overrun: current.estimate_at_completion - bac,
        };
        let completion_prediction = self.predict_completion(&current, project.end_date, today);

        tracing::debug!(
            duration_months,
            points = points.len(),
            has_overrun = overrun_point.is_some(),
            "时间轴投影完成"
        );

        Ok(EvmTimeline {
            budget_at_completion: bac,
            evaluated_on: today,
            duration_months,
            uses_s_curve,
            points,
            cost_baseline,
            eac_trend,
            current_performance,
            overrun_point,
            trend,
            completion_prediction,
        })
    }

    // ==========================================
    // 网格点
    // ==========================================

    fn historical_point(
        &self,
        snapshot: &LedgerSnapshot,
        month_index: u32,
        date: NaiveDate,
        baseline_pv: f64,
    ) -> EngineResult<TimelinePoint> {
        let actual_cost = cumulative_actual_cost(&snapshot.cost_entries, date);
        let obligations = self
            .weighting
            .weighted_total_as_of(&snapshot.obligations, date)?;
        let r = self
            .calculator
            .calculate(&self.input_at(&snapshot.project, date, actual_cost, obligations))?;

        Ok(TimelinePoint {
            month_index,
            month: month_label(date),
            date,
            planned_value: baseline_pv,
            earned_value: r.earned_value,
            actual_cost,
            total_obligations: r.total_obligations,
            actual_plus_obligations: actual_cost + r.total_obligations,
            cost_variance: r.cost_variance,
            schedule_variance: r.earned_value - baseline_pv,
            eac_standard: r.estimate_at_completion,
            eac_adjusted: r.estimate_at_completion_adj,
            cpi_standard: r.cost_performance_index,
            cpi_adjusted: r.cost_performance_index_adj,
            spi: safe_ratio(r.earned_value, baseline_pv),
            budget_breach_risk: r.budget_breach_risk,
            breach_severity: r.breach_severity,
            is_forecast: false,
        })
    }

    /// 预测点: CPI 冻结在评估日,EAC 按月膨胀
    fn forecast_point(
        &self,
        anchor: &Anchor<'_>,
        month_index: u32,
        date: NaiveDate,
        baseline_pv: f64,
        months_ahead: u32,
    ) -> TimelinePoint {
        let current = anchor.current;
        let bac = current.budget_at_completion;
        let cpi_frozen = current.cost_performance_index;

        let delta_pv = (baseline_pv - anchor.baseline_pv).max(0.0);
        let earned_value = (current.earned_value + delta_pv).min(bac);
        let actual_cost = current.actual_cost
            + if cpi_frozen > 0.0 {
                delta_pv / cpi_frozen
            } else {
                delta_pv
            };

        let inflation = 1.0 + self.params.uncertainty_per_month * months_ahead as f64;
        let eac_standard = current.estimate_at_completion * inflation;
        let eac_adjusted = current.estimate_at_completion_adj * inflation;

        let budget_breach_risk = eac_adjusted > bac;
        let breach_percent = if budget_breach_risk {
            (safe_ratio(eac_adjusted, bac) - 1.0) * 100.0
        } else {
            0.0
        };

        TimelinePoint {
            month_index,
            month: month_label(date),
            date,
            planned_value: baseline_pv,
            earned_value,
            actual_cost,
            total_obligations: current.total_obligations,
            actual_plus_obligations: actual_cost + current.total_obligations,
            cost_variance: earned_value - actual_cost,
            schedule_variance: earned_value - baseline_pv,
            eac_standard,
            eac_adjusted,
            cpi_standard: cpi_frozen,
            cpi_adjusted: current.cost_performance_index_adj,
            spi: safe_ratio(earned_value, baseline_pv),
            budget_breach_risk,
            breach_severity: self
                .calculator
                .classify_breach(budget_breach_risk, breach_percent),
            is_forecast: true,
        }
    }

    fn input_at(
        &self,
        project: &Project,
        date: NaiveDate,
        actual_cost: f64,
        obligations: f64,
    ) -> EvmInput {
        EvmInput {
            budget_at_completion: project.total_budget,
            actual_cost,
            start_date: project.start_date,
            end_date: project.end_date,
            today: date,
            cost_estimates: project.cost_estimates.clone(),
            total_obligations: obligations,
            manual_etc_adjusted: None,
            include_obligations: true,
        }
    }

    // ==========================================
    // 基线与分析
    // ==========================================

    /// 计划工期月数 (向上取整,至少 1)
    pub fn duration_months(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let days = (end - start).num_days();
        if days <= 0 {
            return 1;
        }
        ((days as f64 / self.params.days_per_month).ceil() as u32).max(1)
    }

    /// 基线累计比例: 有明细估算用 S 曲线 3t² − 2t³,否则线性
    ///
    /// `position` 为自开工起的月数,可含小数 (评估日锚点)
    fn baseline_fraction(&self, position: f64, duration_months: u32, s_curve: bool) -> f64 {
        let t = (position / duration_months as f64).clamp(0.0, 1.0);
        if s_curve {
            3.0 * t * t - 2.0 * t * t * t
        } else {
            t
        }
    }

    fn find_overrun_point(&self, points: &[TimelinePoint], bac: f64) -> Option<OverrunPoint> {
        let limit = bac * (1.0 + self.params.overrun_threshold);
        points
            .iter()
            .find(|p| p.eac_standard > limit)
            .map(|p| OverrunPoint {
                month: p.month.clone(),
                eac: p.eac_standard,
                budget_exceeded_by: p.eac_standard - bac,
                is_forecast: p.is_forecast,
            })
    }

    /// CPI 趋势 (最近 N 个历史点,首点 − 末点 > 0 表示下降)
    fn analyze_trend(&self, points: &[TimelinePoint]) -> TrendAnalysis {
        let history: Vec<f64> = points
            .iter()
            .filter(|p| !p.is_forecast)
            .map(|p| p.cpi_standard)
            .collect();

        let window_len = self.params.trend_window;
        if history.len() < window_len {
            return TrendAnalysis {
                direction: TrendDirection::InsufficientData,
                severity: None,
                cpi_change: 0.0,
                window: history,
            };
        }

        let window = history[history.len() - window_len..].to_vec();
        let first = window.first().copied().unwrap_or(1.0);
        let last = window.last().copied().unwrap_or(1.0);
        let drop = first - last;

        let (direction, severity) = if drop > self.params.trend_high_drop {
            (TrendDirection::Deteriorating, Some(BreachSeverity::High))
        } else if drop > self.params.trend_medium_drop {
            (TrendDirection::Deteriorating, Some(BreachSeverity::Medium))
        } else if -drop > self.params.trend_medium_drop {
            (TrendDirection::Improving, None)
        } else {
            (TrendDirection::Stable, None)
        };

        TrendAnalysis {
            direction,
            severity,
            cpi_change: drop,
            window,
        }
    }

    fn predict_completion(
        &self,
        current: &EvmResult,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> CompletionPrediction {
        let bac = current.budget_at_completion;
        let eac = current.estimate_at_completion;

        let (progress_pct, overrun_pct) = if bac > 0.0 {
            (round1(current.earned_value / bac * 100.0), (eac - bac) / bac * 100.0)
        } else {
            (0.0, 0.0)
        };

        let days_remaining = (end_date - today).num_days();
        let months_remaining = if days_remaining > 0 {
            (days_remaining as f64 / self.params.days_per_month).ceil() as u32
        } else {
            0
        };

        let cpi = current.cost_performance_index;
        let cost_efficiency = if cpi >= self.params.efficiency_good_cpi {
            CostEfficiency::Good
        } else if cpi < self.params.efficiency_poor_cpi {
            CostEfficiency::Poor
        } else {
            CostEfficiency::Fair
        };

        CompletionPrediction {
            current_progress_pct: progress_pct,
            projected_completion_cost: eac,
            projected_overrun_pct: overrun_pct,
            months_remaining,
            cost_efficiency,
        }
    }
}

impl Default for TimelineProjector {
    fn default() -> Self {
        Self::new(EvmConfig::default())
    }
}

fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
