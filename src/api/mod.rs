// ==========================================
// 项目组合决策引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 与外部调用方使用
// ==========================================

pub mod error;
pub mod portfolio_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use portfolio_api::{PortfolioApi, PortfolioDecision};
