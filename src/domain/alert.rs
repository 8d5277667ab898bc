// ==========================================
// 项目组合决策引擎 - 组合告警领域模型
// ==========================================

use crate::domain::types::AlertSeverity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    HighPredictiveRisk,   // 预测延期风险高
    CostOverrunPredicted, // 预测成本超支
    BurnRateAnomaly,      // 支出燃烧率异常
    ScoreUnavailable,     // 无法评分
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::HighPredictiveRisk => write!(f, "HIGH_PREDICTIVE_RISK"),
            AlertType::CostOverrunPredicted => write!(f, "COST_OVERRUN_PREDICTED"),
            AlertType::BurnRateAnomaly => write!(f, "BURN_RATE_ANOMALY"),
            AlertType::ScoreUnavailable => write!(f, "SCORE_UNAVAILABLE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAlert {
    pub alert_type: AlertType,
    pub project_id: String,
    pub severity: AlertSeverity,
    pub message: String,
}
