// ==========================================
// 项目组合决策引擎 - 引擎层错误类型
// ==========================================
// 仅用于调用方错误（非法约束配置等），直接报告，不做静默修正
// 单项目不可评分、不可行、超时等可恢复结果通过返回值携带
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("强制纳入与强制排除集合重叠: {0:?}")]
    ForcedSetOverlap(Vec<String>),

    #[error("约束上限非法 ({name}): {value}")]
    NonFiniteCap { name: String, value: f64 },

    #[error("强制约束引用了项目表中不存在的项目: {0:?}")]
    UnknownForcedProject(Vec<String>),

    #[error("项目ID重复: {0}")]
    DuplicateProjectId(String),

    #[error("情景评估超时: scenario_id={scenario_id}")]
    ScenarioTimedOut { scenario_id: String },

    #[error("情景评估任务失败: scenario_id={scenario_id}, {message}")]
    ScenarioTaskFailed {
        scenario_id: String,
        message: String,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
