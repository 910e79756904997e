// ==========================================
// 项目成本挣值管理系统 - 配置层
// ==========================================
// 职责: EVM 参数 (权重/阈值/时间轴) 管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod evm_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader::EvmConfigReader;
pub use evm_config::{
    BreachThresholds, ConfidenceWeights, EarnedValueParams, EvmConfig, ForecastParams,
    StatusThresholds, TimelineParams,
};
