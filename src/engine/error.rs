// ==========================================
// 项目成本挣值管理系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 非法输入必须报错,零分母保护除外 (中性比率 1.0)
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvmError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效的置信度等级: {0}（仅支持 high/medium/low）")]
    InvalidConfidenceLevel(String),

    #[error("无效配置 (key={key}): {message}")]
    InvalidConfig { key: String, message: String },
}

pub type EngineResult<T> = Result<T, EvmError>;

/// 校验金额: 必须为有限值且 >= 0
pub(crate) fn ensure_amount(field: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(EvmError::InvalidInput(format!("{} 不是有效数值: {}", field, value)));
    }
    if value < 0.0 {
        return Err(EvmError::InvalidInput(format!("{} 不能为负数: {}", field, value)));
    }
    Ok(())
}
