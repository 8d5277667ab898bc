// ==========================================
// 项目组合决策引擎 - 情景评估
// ==========================================
// 职责: 对 What-If 情景依次执行 评分 → 优化 → 告警
// 每个情景持有独立项目表，可并行评估，结果互不影响
// ==========================================

use crate::config::EngineConfig;
use crate::domain::scenario::{Scenario, ScenarioOutcome};
use crate::domain::score::ScoredProject;
use crate::engine::alerts::AlertEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::optimizer::PortfolioOptimizer;
use crate::engine::scoring::ScoringEngine;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// 调用方超时 = 求解时间预算 + 该宽限
const CALLER_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

pub struct ScenarioEvaluator {
    scoring: ScoringEngine,
    optimizer: PortfolioOptimizer,
    alerts: AlertEngine,
}

impl ScenarioEvaluator {
    pub fn new(scoring: ScoringEngine, config: &EngineConfig) -> Self {
        Self {
            scoring,
            optimizer: PortfolioOptimizer::from_config(config),
            alerts: AlertEngine::from_config(config),
        }
    }

    pub fn with_prior_model(config: &EngineConfig) -> Self {
        Self::new(ScoringEngine::with_prior_model(config), config)
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn optimizer(&self) -> &PortfolioOptimizer {
        &self.optimizer
    }

    pub fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    /// 评估单个情景（同步）
    #[instrument(skip(self, scenario), fields(scenario_id = %scenario.scenario_id, name = %scenario.name))]
    pub fn evaluate(&self, scenario: &Scenario) -> EngineResult<ScenarioOutcome> {
        let (projects, diagnostics) = scenario.materialize();
        for d in &diagnostics {
            warn!(detail = %d, "情景动作未生效");
        }

        let records = self.scoring.score(&projects, scenario.as_of);
        let scored = ScoredProject::pair(projects, records);

        let selection = self.optimizer.optimize(
            &scored,
            scenario.objective,
            &scenario.effective_constraints(),
        )?;
        let alerts = self.alerts.evaluate(&scored);

        info!(
            status = %selection.status,
            funded = selection.funded_count,
            alerts = alerts.len(),
            "情景评估完成"
        );

        Ok(ScenarioOutcome {
            scenario_id: scenario.scenario_id.clone(),
            name: scenario.name.clone(),
            scores: scored.into_iter().map(|sp| sp.record).collect(),
            selection,
            alerts,
            diagnostics,
        })
    }

    /// 并行评估多个情景
    ///
    /// 每个情景在阻塞线程池中求解，调用方另设超时；结果顺序与输入一致
    pub async fn evaluate_all(
        self: Arc<Self>,
        scenarios: Vec<Scenario>,
    ) -> Vec<EngineResult<ScenarioOutcome>> {
        let caller_timeout = self.optimizer.time_budget() + CALLER_TIMEOUT_GRACE;
        info!(scenarios = scenarios.len(), "开始并行评估情景");

        let tasks = scenarios.into_iter().map(|scenario| {
            let evaluator = Arc::clone(&self);
            async move {
                let scenario_id = scenario.scenario_id.clone();
                let handle = tokio::task::spawn_blocking(move || evaluator.evaluate(&scenario));
                match tokio::time::timeout(caller_timeout, handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => Err(EngineError::ScenarioTaskFailed {
                        scenario_id,
                        message: join_err.to_string(),
                    }),
                    Err(_) => {
                        warn!(scenario_id = %scenario_id, "情景评估超出调用方超时");
                        Err(EngineError::ScenarioTimedOut { scenario_id })
                    }
                }
            }
        });

        join_all(tasks).await
    }
}
