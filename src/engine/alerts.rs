// ==========================================
// 项目组合决策引擎 - 组合告警
// ==========================================
// 规则:
// - 延期概率 > high_risk_threshold         → HIGH_PREDICTIVE_RISK
// - 完工成本 > 预算 × cost_overrun_ratio    → COST_OVERRUN_PREDICTED
// - 燃烧率异常                             → BURN_RATE_ANOMALY
// - 无法评分                               → SCORE_UNAVAILABLE
// ==========================================

use crate::config::EngineConfig;
use crate::domain::alert::{AlertType, PortfolioAlert};
use crate::domain::score::ScoredProject;
use crate::domain::types::AlertSeverity;
use tracing::info;

pub struct AlertEngine {
    high_risk_threshold: f64,
    cost_overrun_ratio: f64,
}

impl AlertEngine {
    pub fn new(high_risk_threshold: f64, cost_overrun_ratio: f64) -> Self {
        Self {
            high_risk_threshold,
            cost_overrun_ratio,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.high_risk_threshold, config.cost_overrun_ratio)
    }

    /// 生成告警（按项目输入顺序，同一项目内按规则顺序）
    pub fn evaluate(&self, projects: &[ScoredProject]) -> Vec<PortfolioAlert> {
        let mut alerts = Vec::new();

        for sp in projects {
            let id = sp.project_id();
            let Some(score) = sp.record.score() else {
                let reason = sp
                    .record
                    .unavailable_reason()
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                alerts.push(PortfolioAlert {
                    alert_type: AlertType::ScoreUnavailable,
                    project_id: id.to_string(),
                    severity: AlertSeverity::Info,
                    message: format!("项目 {} 无法评分: {}", id, reason),
                });
                continue;
            };

            if score.delay_probability > self.high_risk_threshold {
                let drivers: Vec<&str> = score
                    .top_drivers(2)
                    .into_iter()
                    .filter(|c| c.contribution > 0.0)
                    .map(|c| c.feature.as_str())
                    .collect();
                alerts.push(PortfolioAlert {
                    alert_type: AlertType::HighPredictiveRisk,
                    project_id: id.to_string(),
                    severity: AlertSeverity::Critical,
                    message: format!(
                        "项目 {} 预测延期概率 {:.0}%，主要因素: {}",
                        id,
                        score.delay_probability * 100.0,
                        drivers.join(", ")
                    ),
                });
            }

            if let Some(budget) = sp.project.budget {
                if budget > 0.0 && score.cost_at_completion > budget * self.cost_overrun_ratio {
                    alerts.push(PortfolioAlert {
                        alert_type: AlertType::CostOverrunPredicted,
                        project_id: id.to_string(),
                        severity: AlertSeverity::Warning,
                        message: format!(
                            "项目 {} 预测完工成本 {:.0} 超出预算 {:.0} ({:.0}%)",
                            id,
                            score.cost_at_completion,
                            budget,
                            (score.cost_at_completion / budget - 1.0) * 100.0
                        ),
                    });
                }
            }

            if let Some(anomaly) = sp.record.burn_anomaly.as_ref().filter(|a| a.is_anomalous) {
                alerts.push(PortfolioAlert {
                    alert_type: AlertType::BurnRateAnomaly,
                    project_id: id.to_string(),
                    severity: AlertSeverity::Warning,
                    message: format!(
                        "项目 {} 支出燃烧指数 {:.2} 偏离同阶段均值 {:.2} ({:+.1}σ)",
                        id, anomaly.burn_index, anomaly.cohort_mean, anomaly.z_score
                    ),
                });
            }
        }

        info!(alerts = alerts.len(), "组合告警生成完成");
        alerts
    }
}
