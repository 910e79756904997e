// ==========================================
// 项目成本挣值管理系统 - 领域类型定义
// ==========================================
// 职责: 枚举类型 + 数据库/展示字符串映射
// 红线: 置信度等级解析失败必须报错,禁止静默回落默认值
// ==========================================

use crate::engine::error::EvmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 置信度等级 (Confidence Level)
// ==========================================
// 固定权重: high=0.95, medium=0.80, low=0.60
// 权重可通过 EvmConfig 调整,此处仅提供默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,   // 高置信度
    Medium, // 中置信度
    Low,    // 低置信度
}

impl ConfidenceLevel {
    /// 默认权重表
    pub fn default_weight(&self) -> f64 {
        match self {
            ConfidenceLevel::High => 0.95,
            ConfidenceLevel::Medium => 0.80,
            ConfidenceLevel::Low => 0.60,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }

    /// 全部等级 (按权重从高到低)
    pub fn all() -> [ConfidenceLevel; 3] {
        [ConfidenceLevel::High, ConfidenceLevel::Medium, ConfidenceLevel::Low]
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(ConfidenceLevel::High),
            "medium" => Ok(ConfidenceLevel::Medium),
            "low" => Ok(ConfidenceLevel::Low),
            _ => Err(EvmError::InvalidConfidenceLevel(s.to_string())),
        }
    }
}

// ==========================================
// 承付款状态 (Obligation Status)
// ==========================================
// 只有 Active 参与加权汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Active,            // 生效中
    Cancelled,         // 已取消
    ConvertedToActual, // 已转为实际成本
}

impl ObligationStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ObligationStatus::Active => "active",
            ObligationStatus::Cancelled => "cancelled",
            ObligationStatus::ConvertedToActual => "converted_to_actual",
        }
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for ObligationStatus {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ObligationStatus::Active),
            "cancelled" => Ok(ObligationStatus::Cancelled),
            "converted_to_actual" => Ok(ObligationStatus::ConvertedToActual),
            _ => Err(EvmError::InvalidInput(format!(
                "未知的承付款状态: {}",
                s
            ))),
        }
    }
}

// ==========================================
// 成本条目付款状态 (Cost Entry Status)
// ==========================================
// Paid 与 Outstanding 均属于已发生成本,都计入 AC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostEntryStatus {
    Paid,        // 已付款
    Outstanding, // 未付款
}

impl CostEntryStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CostEntryStatus::Paid => "paid",
            CostEntryStatus::Outstanding => "outstanding",
        }
    }
}

impl fmt::Display for CostEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for CostEntryStatus {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(CostEntryStatus::Paid),
            "outstanding" => Ok(CostEntryStatus::Outstanding),
            _ => Err(EvmError::InvalidInput(format!("未知的付款状态: {}", s))),
        }
    }
}

// ==========================================
// 项目状态 (Project Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,  // 规划中
    Active,    // 进行中
    OnHold,    // 暂停
    Completed, // 已完成
}

impl ProjectStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(ProjectStatus::Planning),
            "active" => Ok(ProjectStatus::Active),
            "on_hold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(EvmError::InvalidInput(format!("未知的项目状态: {}", s))),
        }
    }
}

// ==========================================
// 阶段状态 (Phase Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted, // 未开始
    InProgress, // 进行中
    Completed,  // 已完成
    Delayed,    // 延期
}

impl PhaseStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PhaseStatus::NotStarted => "not_started",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Delayed => "delayed",
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for PhaseStatus {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not_started" => Ok(PhaseStatus::NotStarted),
            "in_progress" => Ok(PhaseStatus::InProgress),
            "completed" => Ok(PhaseStatus::Completed),
            "delayed" => Ok(PhaseStatus::Delayed),
            _ => Err(EvmError::InvalidInput(format!("未知的阶段状态: {}", s))),
        }
    }
}

// ==========================================
// 超支严重度 (Breach Severity)
// ==========================================
// 顺序: None < Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BreachSeverity {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for BreachSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachSeverity::None => write!(f, "None"),
            BreachSeverity::Low => write!(f, "Low"),
            BreachSeverity::Medium => write!(f, "Medium"),
            BreachSeverity::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 成本状态 (Cost Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostStatus {
    #[serde(rename = "Under Budget")]
    UnderBudget,
    #[serde(rename = "On Budget")]
    OnBudget,
    #[serde(rename = "Over Budget")]
    OverBudget,
}

impl CostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostStatus::UnderBudget => "Under Budget",
            CostStatus::OnBudget => "On Budget",
            CostStatus::OverBudget => "Over Budget",
        }
    }
}

impl fmt::Display for CostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 进度状态 (Schedule Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Ahead,
    #[serde(rename = "On Schedule")]
    OnSchedule,
    Behind,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Ahead => "Ahead",
            ScheduleStatus::OnSchedule => "On Schedule",
            ScheduleStatus::Behind => "Behind",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 预警代码 (Early Warning)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarlyWarning {
    CostControlAlert,        // CPI_adj 低于控制线
    FormalChangeReview,      // EAC_adj 超出预算 10% 以上
    StakeholderNotification, // 超支严重度 High
}

impl EarlyWarning {
    pub fn code(&self) -> &'static str {
        match self {
            EarlyWarning::CostControlAlert => "COST_CONTROL_ALERT",
            EarlyWarning::FormalChangeReview => "FORMAL_CHANGE_REVIEW",
            EarlyWarning::StakeholderNotification => "STAKEHOLDER_NOTIFICATION",
        }
    }
}

impl fmt::Display for EarlyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 成本效率评级 (Cost Efficiency)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostEfficiency {
    Good,
    Fair,
    Poor,
}

impl fmt::Display for CostEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostEfficiency::Good => write!(f, "good"),
            CostEfficiency::Fair => write!(f, "fair"),
            CostEfficiency::Poor => write!(f, "poor"),
        }
    }
}

// ==========================================
// CPI 趋势方向 (Trend Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Deteriorating,
    InsufficientData, // 历史点不足 3 个
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Stable => write!(f, "stable"),
            TrendDirection::Deteriorating => write!(f, "deteriorating"),
            TrendDirection::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

// ==========================================
// 预算使用状态指示 (Budget Status Indicator)
// ==========================================
// 预算使用率: <=75% on_track, <=90% warning, 其余 over_budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatusIndicator {
    OnTrack,
    Warning,
    OverBudget,
}

impl fmt::Display for BudgetStatusIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetStatusIndicator::OnTrack => write!(f, "on_track"),
            BudgetStatusIndicator::Warning => write!(f, "warning"),
            BudgetStatusIndicator::OverBudget => write!(f, "over_budget"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_level_parse_is_strict() {
        assert_eq!("HIGH".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::High);
        assert_eq!(" medium ".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Medium);

        let err = "certain".parse::<ConfidenceLevel>().unwrap_err();
        assert!(matches!(err, EvmError::InvalidConfidenceLevel(ref v) if v == "certain"));
    }

    #[test]
    fn test_confidence_level_serde_rejects_unknown() {
        let parsed: Result<ConfidenceLevel, _> = serde_json::from_str("\"maybe\"");
        assert!(parsed.is_err());

        let high: ConfidenceLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(high, ConfidenceLevel::High);
    }

    #[test]
    fn test_status_labels_serialize_as_display_text() {
        assert_eq!(serde_json::to_string(&CostStatus::OverBudget).unwrap(), "\"Over Budget\"");
        assert_eq!(serde_json::to_string(&ScheduleStatus::OnSchedule).unwrap(), "\"On Schedule\"");
        assert_eq!(
            serde_json::to_string(&EarlyWarning::CostControlAlert).unwrap(),
            "\"COST_CONTROL_ALERT\""
        );
        assert_eq!(BreachSeverity::High.to_string(), "High");
    }

    #[test]
    fn test_obligation_status_round_trip_db_str() {
        for status in [
            ObligationStatus::Active,
            ObligationStatus::Cancelled,
            ObligationStatus::ConvertedToActual,
        ] {
            assert_eq!(status.to_db_str().parse::<ObligationStatus>().unwrap(), status);
        }
        assert!("paid".parse::<ObligationStatus>().is_err());
    }
}
