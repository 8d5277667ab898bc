// ==========================================
// 项目组合决策引擎 - 引擎配置
// ==========================================
// 每个配置项都有默认值，由 ConfigManager 覆写并校验
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("配置文件格式错误: {0}")]
    FormatError(#[from] serde_json::Error),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置值超出范围 (key: {key}): {message}")]
    RangeError { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // ===== 异常检测 =====
    /// 燃烧率异常阈值（标准差倍数）
    pub anomaly_threshold_sd: f64,
    /// 同阶段参与比较的最少项目数（不含自身）
    pub anomaly_min_cohort: usize,

    // ===== 需求预测 =====
    /// 预测所需最少历史期数
    pub forecast_min_history: usize,
    /// 预测期数
    pub forecast_horizon: usize,
    /// 预测区间置信度 (0~1)
    pub forecast_confidence: f64,

    // ===== 优化求解 =====
    /// 求解时间预算（秒）
    pub solver_time_budget_secs: f64,

    // ===== 模型训练 =====
    /// 训练延期模型所需最少样本数
    pub min_training_samples: usize,

    // ===== 告警 =====
    /// 高延期风险阈值
    pub high_risk_threshold: f64,
    /// 成本超支告警比例（EAC / BAC）
    pub cost_overrun_ratio: f64,

    // ===== 聚类 =====
    /// 项目原型数量
    pub archetype_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold_sd: 2.0,
            anomaly_min_cohort: 3,
            forecast_min_history: 8,
            forecast_horizon: 12,
            forecast_confidence: 0.8,
            solver_time_budget_secs: 10.0,
            min_training_samples: 5,
            high_risk_threshold: 0.7,
            cost_overrun_ratio: 1.1,
            archetype_count: 3,
        }
    }
}

impl EngineConfig {
    /// 校验配置取值范围
    ///
    /// 非法配置属于调用方错误，直接返回 Err，不做静默修正
    pub fn validate(&self) -> ConfigResult<()> {
        fn range_err(key: &str, message: String) -> ConfigError {
            ConfigError::RangeError {
                key: key.to_string(),
                message,
            }
        }

        if !(self.anomaly_threshold_sd.is_finite() && self.anomaly_threshold_sd > 0.0) {
            return Err(range_err(
                "anomaly_threshold_sd",
                format!("必须为正数，实际 {}", self.anomaly_threshold_sd),
            ));
        }
        if self.anomaly_min_cohort < 2 {
            return Err(range_err(
                "anomaly_min_cohort",
                format!("至少为 2，实际 {}", self.anomaly_min_cohort),
            ));
        }
        if self.forecast_min_history < 3 {
            return Err(range_err(
                "forecast_min_history",
                format!("至少为 3，实际 {}", self.forecast_min_history),
            ));
        }
        if self.forecast_horizon == 0 {
            return Err(range_err("forecast_horizon", "必须大于 0".to_string()));
        }
        if !(self.forecast_confidence > 0.0 && self.forecast_confidence < 1.0) {
            return Err(range_err(
                "forecast_confidence",
                format!("必须在 (0, 1) 内，实际 {}", self.forecast_confidence),
            ));
        }
        if !(self.solver_time_budget_secs.is_finite() && self.solver_time_budget_secs > 0.0) {
            return Err(range_err(
                "solver_time_budget_secs",
                format!("必须为正数，实际 {}", self.solver_time_budget_secs),
            ));
        }
        if self.min_training_samples < 2 {
            return Err(range_err(
                "min_training_samples",
                format!("至少为 2，实际 {}", self.min_training_samples),
            ));
        }
        if !(0.0..=1.0).contains(&self.high_risk_threshold) {
            return Err(range_err(
                "high_risk_threshold",
                format!("必须在 [0, 1] 内，实际 {}", self.high_risk_threshold),
            ));
        }
        if !(self.cost_overrun_ratio.is_finite() && self.cost_overrun_ratio >= 1.0) {
            return Err(range_err(
                "cost_overrun_ratio",
                format!("必须 >= 1.0，实际 {}", self.cost_overrun_ratio),
            ));
        }
        if self.archetype_count == 0 {
            return Err(range_err("archetype_count", "必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 求解时间预算
    pub fn solver_time_budget(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.solver_time_budget_secs)
    }
}
