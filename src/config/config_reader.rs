// ==========================================
// 项目成本挣值管理系统 - EVM 配置读取 Trait
// ==========================================
// 职责: 定义引擎参数的读取接口（不包含实现）
// 实现者: ConfigManager（从 config_kv 表读取）
// ==========================================

use crate::config::evm_config::{BreachThresholds, ConfidenceWeights, EvmConfig, TimelineParams};
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait EvmConfigReader: Send + Sync {
    /// 置信度权重
    ///
    /// # 默认值
    /// - high=0.95, medium=0.80, low=0.60
    async fn get_confidence_weights(
        &self,
    ) -> Result<ConfidenceWeights, Box<dyn Error + Send + Sync>>;

    /// 超支严重度阈值
    ///
    /// # 默认值
    /// - high_pct=10, medium_pct=5
    async fn get_breach_thresholds(&self) -> Result<BreachThresholds, Box<dyn Error + Send + Sync>>;

    /// 时间轴参数
    async fn get_timeline_params(&self) -> Result<TimelineParams, Box<dyn Error + Send + Sync>>;

    /// 全量配置（已校验）
    async fn load_evm_config(&self) -> Result<EvmConfig, Box<dyn Error + Send + Sync>>;
}
