// ==========================================
// 项目组合决策引擎 - 资源需求预测领域模型
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DemandSeries - 职能需求历史序列
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub period: NaiveDate, // 期间起始日
    pub fte: f64,          // 该期需求 FTE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSeries {
    pub function: String,
    pub points: Vec<DemandPoint>,
}

impl DemandSeries {
    pub fn new(function: &str, points: Vec<DemandPoint>) -> Self {
        Self {
            function: function.to_string(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ==========================================
// 预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub step: u32,                  // 向前第几期 (1..=horizon)
    pub period: Option<NaiveDate>,  // 推算的期间日期
    pub point: f64,                 // 点预测
    pub lower: f64,                 // 区间下界 (>= 0)
    pub upper: f64,                 // 区间上界
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceForecast {
    pub function: String,
    pub alpha: f64,          // 水平平滑系数
    pub beta: f64,           // 趋势平滑系数
    pub residual_std: f64,   // 一步预测残差标准差
    pub confidence: f64,     // 区间置信度
    pub points: Vec<ForecastPoint>,
}

/// 产能缺口峰值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityGap {
    pub step: u32,
    pub period: Option<NaiveDate>,
    pub gap_fte: f64, // 点预测 - 产能（正数表示短缺）
}

impl ResourceForecast {
    /// 预测期内需求超出产能最多的一期
    ///
    /// 全部期间都不超出时返回 None
    pub fn peak_gap(&self, capacity_fte: f64) -> Option<CapacityGap> {
        self.points
            .iter()
            .map(|p| CapacityGap {
                step: p.step,
                period: p.period,
                gap_fte: p.point - capacity_fte,
            })
            .filter(|g| g.gap_fte > 0.0)
            .fold(None, |best: Option<CapacityGap>, g| match best {
                Some(b) if b.gap_fte >= g.gap_fte => Some(b),
                _ => Some(g),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastUnavailableReason {
    InsufficientHistory { required: usize, actual: usize },
    InvalidValue { index: usize, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastOutcome {
    Available(ResourceForecast),
    Unavailable {
        function: String,
        reason: ForecastUnavailableReason,
    },
}

impl ForecastOutcome {
    pub fn forecast(&self) -> Option<&ResourceForecast> {
        match self {
            ForecastOutcome::Available(f) => Some(f),
            ForecastOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.forecast().is_some()
    }
}
