// ==========================================
// 项目成本挣值管理系统 - 台账 CSV 导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → 类型转换 → 领域校验
// 输出: CostEntry / Obligation 列表 (不落库,由调用方写入仓储)
// 红线: 任一行非法即整体失败,错误带行号; 置信度等级不做默认
// ==========================================

use crate::domain::cost_entry::{CostEntry, CostEntryDraft};
use crate::domain::obligation::Obligation;
use crate::domain::types::{ConfidenceLevel, CostEntryStatus, ObligationStatus};
use crate::engine::error::{ensure_amount, EvmError};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, RawRecord};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

// ==========================================
// CsvLedgerImporter
// ==========================================
pub struct CsvLedgerImporter {
    project_id: String,
    /// 未填写 entry_date 时使用
    today: NaiveDate,
    parser: CsvParser,
}

impl CsvLedgerImporter {
    /// 构造函数
    ///
    /// # 参数
    /// - `project_id`: 导入记录所属项目
    /// - `today`: 缺省入账日期
    pub fn new(project_id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            project_id: project_id.into(),
            today,
            parser: CsvParser,
        }
    }

    // ==========================================
    // 成本条目
    // ==========================================

    /// 导入成本条目文件
    ///
    /// # 列
    /// - 必填: category
    /// - 金额 (三选一): total_amount | hours + hourly_rate | quantity + unit_price
    /// - 可选: id, phase_id, description, entry_date, status, due_date
    pub fn import_cost_entries(&self, path: &Path) -> ImportResult<Vec<CostEntry>> {
        let records = self.parser.parse_path(path)?;
        self.map_cost_entries(records, &path.display().to_string())
    }

    pub fn import_cost_entries_from_reader<R: Read>(
        &self,
        input: R,
    ) -> ImportResult<Vec<CostEntry>> {
        let records = self.parser.parse_reader(input)?;
        self.map_cost_entries(records, "<reader>")
    }

    fn map_cost_entries(
        &self,
        records: Vec<RawRecord>,
        source: &str,
    ) -> ImportResult<Vec<CostEntry>> {
        let entries = records
            .iter()
            .map(|(row, fields)| self.map_cost_entry(*row, fields))
            .collect::<ImportResult<Vec<_>>>()?;

        tracing::info!(source, count = entries.len(), "成本条目导入解析完成");
        Ok(entries)
    }

    fn map_cost_entry(
        &self,
        row: usize,
        fields: &HashMap<String, String>,
    ) -> ImportResult<CostEntry> {
        let draft = CostEntryDraft {
            project_id: self.project_id.clone(),
            phase_id: optional_text(fields, "phase_id"),
            category_name: required_text(row, fields, "category")?,
            description: optional_text(fields, "description").unwrap_or_default(),
            hours: optional_number(row, fields, "hours")?,
            hourly_rate: optional_number(row, fields, "hourly_rate")?,
            quantity: optional_number(row, fields, "quantity")?,
            unit_price: optional_number(row, fields, "unit_price")?,
            total_amount: optional_number(row, fields, "total_amount")?,
            entry_date: optional_date(row, fields, "entry_date")?,
            status: optional_parsed::<CostEntryStatus>(row, fields, "status")?,
            due_date: optional_date(row, fields, "due_date")?,
        };

        let id = optional_text(fields, "id").unwrap_or_else(|| Uuid::new_v4().to_string());
        draft
            .into_entry(id, self.today)
            .map_err(|source| ImportError::InvalidRecord { row, source })
    }

    // ==========================================
    // 承付款
    // ==========================================

    /// 导入承付款文件
    ///
    /// # 列
    /// - 必填: category, amount, confidence_level (high/medium/low)
    /// - 可选: id, description, status, committed_on, expected_incur_date
    pub fn import_obligations(&self, path: &Path) -> ImportResult<Vec<Obligation>> {
        let records = self.parser.parse_path(path)?;
        self.map_obligations(records, &path.display().to_string())
    }

    pub fn import_obligations_from_reader<R: Read>(
        &self,
        input: R,
    ) -> ImportResult<Vec<Obligation>> {
        let records = self.parser.parse_reader(input)?;
        self.map_obligations(records, "<reader>")
    }

    fn map_obligations(
        &self,
        records: Vec<RawRecord>,
        source: &str,
    ) -> ImportResult<Vec<Obligation>> {
        let obligations = records
            .iter()
            .map(|(row, fields)| self.map_obligation(*row, fields))
            .collect::<ImportResult<Vec<_>>>()?;

        tracing::info!(source, count = obligations.len(), "承付款导入解析完成");
        Ok(obligations)
    }

    fn map_obligation(
        &self,
        row: usize,
        fields: &HashMap<String, String>,
    ) -> ImportResult<Obligation> {
        let amount = required_number(row, fields, "amount")?;
        ensure_amount("amount", amount)
            .map_err(|source| ImportError::InvalidRecord { row, source })?;

        let level_raw = required_text(row, fields, "confidence_level")?;
        let confidence_level = ConfidenceLevel::from_str(&level_raw)
            .map_err(|source| ImportError::InvalidRecord { row, source })?;

        Ok(Obligation {
            id: optional_text(fields, "id").unwrap_or_else(|| Uuid::new_v4().to_string()),
            project_id: self.project_id.clone(),
            category_name: required_text(row, fields, "category")?,
            description: optional_text(fields, "description").unwrap_or_default(),
            amount,
            confidence_level,
            status: optional_parsed::<ObligationStatus>(row, fields, "status")?
                .unwrap_or(ObligationStatus::Active),
            committed_on: optional_date(row, fields, "committed_on")?,
            expected_incur_date: optional_date(row, fields, "expected_incur_date")?,
        })
    }
}

// ==========================================
// 字段转换
// ==========================================

fn optional_text(fields: &HashMap<String, String>, field: &str) -> Option<String> {
    fields.get(field).filter(|v| !v.is_empty()).cloned()
}

fn required_text(
    row: usize,
    fields: &HashMap<String, String>,
    field: &str,
) -> ImportResult<String> {
    optional_text(fields, field).ok_or_else(|| ImportError::MissingField {
        row,
        field: field.to_string(),
    })
}

fn optional_number(
    row: usize,
    fields: &HashMap<String, String>,
    field: &str,
) -> ImportResult<Option<f64>> {
    optional_text(fields, field)
        .map(|raw| {
            raw.replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ImportError::TypeConversionError {
                    row,
                    field: field.to_string(),
                    message: format!("无法解析为数值: {}", raw),
                })
        })
        .transpose()
}

fn required_number(row: usize, fields: &HashMap<String, String>, field: &str) -> ImportResult<f64> {
    optional_number(row, fields, field)?.ok_or_else(|| ImportError::MissingField {
        row,
        field: field.to_string(),
    })
}

fn optional_date(
    row: usize,
    fields: &HashMap<String, String>,
    field: &str,
) -> ImportResult<Option<NaiveDate>> {
    optional_text(fields, field)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(&raw, "%Y%m%d"))
                .map_err(|_| ImportError::DateFormatError {
                    row,
                    field: field.to_string(),
                    value: raw.clone(),
                })
        })
        .transpose()
}

fn optional_parsed<T>(
    row: usize,
    fields: &HashMap<String, String>,
    field: &str,
) -> ImportResult<Option<T>>
where
    T: FromStr<Err = EvmError>,
{
    optional_text(fields, field)
        .map(|raw| T::from_str(&raw).map_err(|source| ImportError::InvalidRecord { row, source }))
        .transpose()
}
