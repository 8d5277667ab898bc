// ==========================================
// 项目组合决策引擎 - API层错误类型
// ==========================================
// 职责: 统一引擎/配置/导入各层错误，给调用方可读的原因
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("约束配置错误: {0}")]
    ConstraintError(String),

    // ==========================================
    // 下层错误
    // ==========================================
    #[error("情景评估失败: {0}")]
    ScenarioError(String),

    #[error("配置错误: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("文件导入失败: {0}")]
    ImportError(#[from] ImportError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ScenarioTimedOut { .. } | EngineError::ScenarioTaskFailed { .. } => {
                ApiError::ScenarioError(err.to_string())
            }
            EngineError::DuplicateProjectId(_) => ApiError::InvalidInput(err.to_string()),
            EngineError::ForcedSetOverlap(_)
            | EngineError::NonFiniteCap { .. }
            | EngineError::UnknownForcedProject(_) => ApiError::ConstraintError(err.to_string()),
        }
    }
}

/// API层 Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
