// ==========================================
// 项目成本挣值管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供报表/服务层调用
// ==========================================

pub mod dto;
pub mod error;
pub mod evm_api;

// 重导出核心类型
pub use dto::{EvmOptions, EvmReport, PortfolioReport, ProjectDashboard};
pub use error::{ApiError, ApiResult};
pub use evm_api::EvmApi;
