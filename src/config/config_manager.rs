// ==========================================
// 项目组合决策引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: key-value（来自 JSON 文件或调用方传入的映射）
// ==========================================

use crate::config::engine_config::{ConfigError, ConfigResult, EngineConfig};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 key-value 映射创建
    pub fn from_kv<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 从 JSON 文件加载
    ///
    /// 文件内容为扁平 JSON 对象，值可为字符串、数字或布尔
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let manager = Self::from_json_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            keys = manager.values.len(),
            "配置文件加载完成"
        );
        Ok(manager)
    }

    /// 从 JSON 字符串加载
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let parsed: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        let values = parsed
            .into_iter()
            .map(|(k, v)| {
                let s = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, s)
            })
            .collect();
        Ok(Self { values })
    }

    /// 覆写单个配置
    pub fn set(&mut self, key: &str, value: &str) {
        debug!(key = key, value = value, "覆写配置");
        self.values.insert(key.to_string(), value.to_string());
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 读取并解析配置值，缺失时使用默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::ValueError {
                key: key.to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 生成引擎配置（已校验）
    pub fn engine_config(&self) -> ConfigResult<EngineConfig> {
        let d = EngineConfig::default();
        let config = EngineConfig {
            anomaly_threshold_sd: self
                .get_parsed_or_default(config_keys::ANOMALY_THRESHOLD_SD, d.anomaly_threshold_sd)?,
            anomaly_min_cohort: self
                .get_parsed_or_default(config_keys::ANOMALY_MIN_COHORT, d.anomaly_min_cohort)?,
            forecast_min_history: self
                .get_parsed_or_default(config_keys::FORECAST_MIN_HISTORY, d.forecast_min_history)?,
            forecast_horizon: self
                .get_parsed_or_default(config_keys::FORECAST_HORIZON, d.forecast_horizon)?,
            forecast_confidence: self
                .get_parsed_or_default(config_keys::FORECAST_CONFIDENCE, d.forecast_confidence)?,
            solver_time_budget_secs: self.get_parsed_or_default(
                config_keys::SOLVER_TIME_BUDGET_SECS,
                d.solver_time_budget_secs,
            )?,
            min_training_samples: self
                .get_parsed_or_default(config_keys::MIN_TRAINING_SAMPLES, d.min_training_samples)?,
            high_risk_threshold: self
                .get_parsed_or_default(config_keys::HIGH_RISK_THRESHOLD, d.high_risk_threshold)?,
            cost_overrun_ratio: self
                .get_parsed_or_default(config_keys::COST_OVERRUN_RATIO, d.cost_overrun_ratio)?,
            archetype_count: self
                .get_parsed_or_default(config_keys::ARCHETYPE_COUNT, d.archetype_count)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在情景评估结果中记录配置快照，保证结果可复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&json!(self.values))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 异常检测
    pub const ANOMALY_THRESHOLD_SD: &str = "anomaly_threshold_sd";
    pub const ANOMALY_MIN_COHORT: &str = "anomaly_min_cohort";

    // 需求预测
    pub const FORECAST_MIN_HISTORY: &str = "forecast_min_history";
    pub const FORECAST_HORIZON: &str = "forecast_horizon";
    pub const FORECAST_CONFIDENCE: &str = "forecast_confidence";

    // 优化求解
    pub const SOLVER_TIME_BUDGET_SECS: &str = "solver_time_budget_secs";

    // 模型训练
    pub const MIN_TRAINING_SAMPLES: &str = "min_training_samples";

    // 告警
    pub const HIGH_RISK_THRESHOLD: &str = "high_risk_threshold";
    pub const COST_OVERRUN_RATIO: &str = "cost_overrun_ratio";

    // 聚类
    pub const ARCHETYPE_COUNT: &str = "archetype_count";
}
