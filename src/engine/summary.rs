// ==========================================
// 项目成本挣值管理系统 - 项目汇总引擎
// ==========================================
// 职责: 预算使用率、阶段/分类分解、支出趋势、付款时间表
// 输入: 台账快照 + 评估日
// 输出: ProjectSummary
// ==========================================

use crate::domain::cost_entry::CostEntry;
use crate::domain::project::LedgerSnapshot;
use crate::domain::summary::{
    DailyAmount, MonthlyAmount, PaymentTimeline, PhaseSummary, ProjectSummary,
};
use crate::domain::types::BudgetStatusIndicator;
use crate::engine::error::{ensure_amount, EngineResult};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::instrument;

/// 最近条目数量
pub const RECENT_ENTRY_LIMIT: usize = 10;

/// 付款提醒窗口 (天)
pub const PAYMENT_WINDOW_DAYS: i64 = 30;

// ==========================================
// ProjectSummaryEngine - 项目汇总引擎
// ==========================================
pub struct ProjectSummaryEngine {
    // 无状态引擎
}

impl ProjectSummaryEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成项目汇总
    ///
    /// # 参数
    /// - `snapshot`: 台账快照
    /// - `today`: 评估日 (付款时间表分桶基准)
    #[instrument(skip(self, snapshot), fields(project_id = %snapshot.project.id))]
    pub fn summarize(
        &self,
        snapshot: &LedgerSnapshot,
        today: NaiveDate,
    ) -> EngineResult<ProjectSummary> {
        let project = &snapshot.project;
        ensure_amount("total_budget", project.total_budget)?;
        for entry in &snapshot.cost_entries {
            ensure_amount(&format!("cost_entry[{}].amount", entry.id), entry.amount)?;
        }

        let entries = &snapshot.cost_entries;
        let total_spent = entries.iter().fold(0.0, |acc, e| acc + e.amount);
        let total_outstanding = entries
            .iter()
            .filter(|e| e.is_outstanding())
            .fold(0.0, |acc, e| acc + e.amount);
        let total_paid = total_spent - total_outstanding;

        let budget = project.total_budget;
        let budget_utilization = percentage(total_spent, budget);

        Ok(ProjectSummary {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            total_budget: budget,
            total_spent,
            total_paid,
            total_outstanding,
            budget_remaining_actual: budget - total_spent,
            budget_remaining_committed: budget - total_paid,
            budget_utilization,
            status_indicator: status_indicator(budget_utilization),
            phases_summary: self.phase_summaries(snapshot),
            cost_breakdown: breakdown(entries.iter()),
            paid_breakdown: breakdown(entries.iter().filter(|e| !e.is_outstanding())),
            outstanding_breakdown: breakdown(entries.iter().filter(|e| e.is_outstanding())),
            trend_data: daily_trend(entries),
            monthly_trend: monthly_trend(entries),
            recent_entries: recent_entries(entries),
            payment_timeline: self.payment_timeline(entries, today),
        })
    }

    fn phase_summaries(&self, snapshot: &LedgerSnapshot) -> Vec<PhaseSummary> {
        snapshot
            .phases
            .iter()
            .map(|phase| {
                let spent = snapshot
                    .cost_entries
                    .iter()
                    .filter(|e| e.phase_id.as_deref() == Some(phase.id.as_str()))
                    .fold(0.0, |acc, e| acc + e.amount);

                PhaseSummary {
                    id: phase.id.clone(),
                    name: phase.name.clone(),
                    budget_allocated: phase.budget_allocation,
                    amount_spent: spent,
                    budget_remaining: phase.budget_allocation - spent,
                    utilization_percentage: percentage(spent, phase.budget_allocation),
                    status: phase.status,
                }
            })
            .collect()
    }

    /// 未付款条目按到期日分桶
    pub fn payment_timeline(&self, entries: &[CostEntry], today: NaiveDate) -> PaymentTimeline {
        let window_end = today + Duration::days(PAYMENT_WINDOW_DAYS);
        let mut timeline = PaymentTimeline::default();

        let mut outstanding: Vec<&CostEntry> =
            entries.iter().filter(|e| e.is_outstanding()).collect();
        outstanding.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

        for entry in outstanding {
            match entry.due_date {
                None => timeline.undated.push(entry.clone()),
                Some(due) if due < today => {
                    timeline.overdue_total += entry.amount;
                    timeline.overdue.push(entry.clone());
                }
                Some(due) if due <= window_end => {
                    timeline.upcoming_total += entry.amount;
                    timeline.due_within_30_days.push(entry.clone());
                }
                Some(_) => timeline.later.push(entry.clone()),
            }
        }

        timeline
    }
}

impl Default for ProjectSummaryEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// 预算使用状态: <=75% on_track, <=90% warning, 其余 over_budget
pub fn status_indicator(utilization: f64) -> BudgetStatusIndicator {
    if utilization <= 75.0 {
        BudgetStatusIndicator::OnTrack
    } else if utilization <= 90.0 {
        BudgetStatusIndicator::Warning
    } else {
        BudgetStatusIndicator::OverBudget
    }
}

fn breakdown<'a>(entries: impl Iterator<Item = &'a CostEntry>) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    for entry in entries {
        *map.entry(entry.category_name.clone()).or_insert(0.0) += entry.amount;
    }
    map
}

fn daily_trend(entries: &[CostEntry]) -> Vec<DailyAmount> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        *by_day.entry(entry.entry_date).or_insert(0.0) += entry.amount;
    }
    by_day
        .into_iter()
        .map(|(date, amount)| DailyAmount { date, amount })
        .collect()
}

fn monthly_trend(entries: &[CostEntry]) -> Vec<MonthlyAmount> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        *by_month
            .entry(entry.entry_date.format("%Y-%m").to_string())
            .or_insert(0.0) += entry.amount;
    }
    by_month
        .into_iter()
        .map(|(month, amount)| MonthlyAmount { month, amount })
        .collect()
}

fn recent_entries(entries: &[CostEntry]) -> Vec<CostEntry> {
    let mut sorted: Vec<&CostEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then_with(|| a.id.cmp(&b.id)));
    sorted.into_iter().take(RECENT_ENTRY_LIMIT).cloned().collect()
}
