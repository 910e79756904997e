// ==========================================
// 项目成本挣值管理系统 - 成本条目领域模型
// ==========================================

use crate::domain::types::CostEntryStatus;
use crate::engine::error::{EvmError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CostEntry - 已记录的成本条目
// ==========================================
// Paid / Outstanding 都属于已发生成本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub phase_id: Option<String>,
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub entry_date: NaiveDate,
    pub status: CostEntryStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl CostEntry {
    pub fn is_outstanding(&self) -> bool {
        self.status == CostEntryStatus::Outstanding
    }

    pub fn incurred_by(&self, date: NaiveDate) -> bool {
        self.entry_date <= date
    }
}

/// 截至 `as_of`(含) 的累计实际成本
pub fn cumulative_actual_cost(entries: &[CostEntry], as_of: NaiveDate) -> f64 {
    entries
        .iter()
        .filter(|e| e.incurred_by(as_of))
        .fold(0.0, |acc, e| acc + e.amount)
}

// ==========================================
// CostEntryDraft - 待入账的成本条目
// ==========================================
// 金额解析顺序: total_amount → hours × hourly_rate → quantity × unit_price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEntryDraft {
    pub project_id: String,
    #[serde(default)]
    pub phase_id: Option<String>,
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<CostEntryStatus>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl CostEntryDraft {
    /// 解析条目金额
    ///
    /// # 返回
    /// - Ok(f64): 条目金额
    /// - Err(InvalidInput): 无法计算金额或金额非法
    pub fn resolve_amount(&self) -> EngineResult<f64> {
        let amount = match (
            self.total_amount,
            self.hours,
            self.hourly_rate,
            self.quantity,
            self.unit_price,
        ) {
            (Some(total), _, _, _, _) if total != 0.0 => total,
            (_, Some(h), Some(r), _, _) if h != 0.0 && r != 0.0 => h * r,
            (_, _, _, Some(q), Some(p)) if q != 0.0 && p != 0.0 => q * p,
            _ => {
                return Err(EvmError::InvalidInput(
                    "无法计算条目金额: 需要 total_amount、hours×hourly_rate 或 quantity×unit_price".to_string(),
                ))
            }
        };

        crate::engine::error::ensure_amount("amount", amount)?;
        Ok(amount)
    }

    /// 转换为成本条目
    ///
    /// # 参数
    /// - `id`: 条目ID
    /// - `today`: 未指定 entry_date 时使用
    pub fn into_entry(self, id: String, today: NaiveDate) -> EngineResult<CostEntry> {
        let amount = self.resolve_amount()?;
        Ok(CostEntry {
            id,
            project_id: self.project_id,
            phase_id: self.phase_id,
            category_name: self.category_name,
            description: self.description,
            amount,
            entry_date: self.entry_date.unwrap_or(today),
            status: self.status.unwrap_or(CostEntryStatus::Outstanding),
            due_date: self.due_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CostEntryDraft {
        CostEntryDraft {
            project_id: "P1".to_string(),
            category_name: "Planning (INT)".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_amount_from_hours() {
        let d = CostEntryDraft {
            hours: Some(16.0),
            hourly_rate: Some(85.0),
            ..draft()
        };
        assert_eq!(d.resolve_amount().unwrap(), 1360.0);
    }

    #[test]
    fn test_resolve_amount_from_quantity() {
        let d = CostEntryDraft {
            quantity: Some(5.0),
            unit_price: Some(1200.0),
            ..draft()
        };
        assert_eq!(d.resolve_amount().unwrap(), 6000.0);
    }

    #[test]
    fn test_explicit_total_wins() {
        let d = CostEntryDraft {
            total_amount: Some(2500.0),
            hours: Some(10.0),
            hourly_rate: Some(50.0),
            ..draft()
        };
        assert_eq!(d.resolve_amount().unwrap(), 2500.0);
    }

    #[test]
    fn test_missing_calculation_data_is_rejected() {
        assert!(matches!(draft().resolve_amount(), Err(EvmError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let d = CostEntryDraft {
            total_amount: Some(-10.0),
            ..draft()
        };
        assert!(d.resolve_amount().is_err());
    }

    #[test]
    fn test_into_entry_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 25).unwrap();
        let entry = CostEntryDraft {
            total_amount: Some(100.0),
            ..draft()
        }
        .into_entry("E1".to_string(), today)
        .unwrap();

        assert_eq!(entry.entry_date, today);
        assert_eq!(entry.status, CostEntryStatus::Outstanding);
    }
}
