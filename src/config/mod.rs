// ==========================================
// 项目组合决策引擎 - 配置层
// ==========================================
// 职责: 引擎配置管理,支持文件/映射覆写
// ==========================================

pub mod config_manager;
pub mod engine_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::{ConfigError, ConfigResult, EngineConfig};
