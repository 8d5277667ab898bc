// ==========================================
// 项目组合决策引擎 - 组合 API
// ==========================================
// 职责: 对外统一入口，组合评分/优化/预测/聚类/告警/情景引擎
// 架构: API 层 → Engine 层（纯计算）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, EngineConfig};
use crate::domain::alert::PortfolioAlert;
use crate::domain::archetype::ArchetypeResult;
use crate::domain::forecast::{CapacityGap, DemandSeries, ForecastOutcome};
use crate::domain::project::Project;
use crate::domain::scenario::{Scenario, ScenarioOutcome};
use crate::domain::score::{ScoreRecord, ScoredProject};
use crate::domain::selection::{ConstraintSet, SelectionResult};
use crate::domain::types::ObjectiveKind;
use crate::engine::{
    ArchetypeClusterer, DemandForecaster, ScenarioEvaluator, ScoringEngine,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

// ==========================================
// PortfolioDecision - 评分 + 优化一次完成的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDecision {
    pub as_of: NaiveDate,
    pub model_name: String,
    pub scores: Vec<ScoreRecord>,
    pub selection: SelectionResult,
    pub alerts: Vec<PortfolioAlert>,
}

// ==========================================
// PortfolioApi
// ==========================================
pub struct PortfolioApi {
    config: EngineConfig,
    evaluator: Arc<ScenarioEvaluator>,
    forecaster: DemandForecaster,
    clusterer: ArchetypeClusterer,
}

impl PortfolioApi {
    /// 使用先验延期模型创建
    ///
    /// # 返回
    /// - Err(ApiError::ConfigError): 配置取值非法
    pub fn new(config: EngineConfig) -> ApiResult<Self> {
        config.validate()?;
        let scoring = ScoringEngine::with_prior_model(&config);
        Ok(Self::assemble(config, scoring))
    }

    /// 从配置管理器创建
    pub fn from_config_manager(manager: &ConfigManager) -> ApiResult<Self> {
        Self::new(manager.engine_config()?)
    }

    /// 基于历史已完成项目训练延期模型后创建
    pub fn with_history(
        config: EngineConfig,
        history: &[Project],
        as_of: NaiveDate,
    ) -> ApiResult<Self> {
        config.validate()?;
        let scoring = ScoringEngine::train(history, as_of, &config);
        Ok(Self::assemble(config, scoring))
    }

    fn assemble(config: EngineConfig, scoring: ScoringEngine) -> Self {
        info!(model = scoring.model_name(), "组合 API 初始化");
        Self {
            evaluator: Arc::new(ScenarioEvaluator::new(scoring, &config)),
            forecaster: DemandForecaster::from_config(&config),
            clusterer: ArchetypeClusterer::new(config.archetype_count),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.evaluator.scoring().model_name()
    }

    // ==========================================
    // 评分
    // ==========================================

    /// 批量评分（与输入等长、同序）
    pub fn score_projects(&self, projects: &[Project], as_of: NaiveDate) -> Vec<ScoreRecord> {
        self.evaluator.scoring().score(projects, as_of)
    }

    /// 评分并与项目配对（作为优化/聚类/告警的输入）
    pub fn score_and_pair(&self, projects: &[Project], as_of: NaiveDate) -> Vec<ScoredProject> {
        ScoredProject::zip(projects, self.score_projects(projects, as_of))
    }

    // ==========================================
    // 优化
    // ==========================================

    /// 对已评分项目求解资助组合
    pub fn optimize(
        &self,
        scored: &[ScoredProject],
        objective: ObjectiveKind,
        constraints: &ConstraintSet,
    ) -> ApiResult<SelectionResult> {
        Ok(self.evaluator.optimizer().optimize(scored, objective, constraints)?)
    }

    /// 评分 → 优化 → 告警
    pub fn decide(
        &self,
        projects: &[Project],
        as_of: NaiveDate,
        objective: ObjectiveKind,
        constraints: &ConstraintSet,
    ) -> ApiResult<PortfolioDecision> {
        if projects.is_empty() {
            return Err(ApiError::InvalidInput("项目表为空".to_string()));
        }
        let scored = self.score_and_pair(projects, as_of);
        let selection = self.optimize(&scored, objective, constraints)?;
        let alerts = self.evaluator.alerts().evaluate(&scored);
        Ok(PortfolioDecision {
            as_of,
            model_name: self.model_name().to_string(),
            scores: scored.into_iter().map(|sp| sp.record).collect(),
            selection,
            alerts,
        })
    }

    // ==========================================
    // 情景
    // ==========================================

    pub fn evaluate_scenario(&self, scenario: &Scenario) -> ApiResult<ScenarioOutcome> {
        Ok(self.evaluator.evaluate(scenario)?)
    }

    /// 并行评估多个情景（结果顺序与输入一致）
    pub async fn run_scenarios(&self, scenarios: Vec<Scenario>) -> Vec<ApiResult<ScenarioOutcome>> {
        Arc::clone(&self.evaluator)
            .evaluate_all(scenarios)
            .await
            .into_iter()
            .map(|r| r.map_err(ApiError::from))
            .collect()
    }

    // ==========================================
    // 需求预测与产能缺口
    // ==========================================

    pub fn forecast_demand(&self, series: &[DemandSeries]) -> Vec<ForecastOutcome> {
        self.forecaster.forecast_all(series)
    }

    /// 各职能的产能缺口峰值（只返回存在缺口的职能）
    ///
    /// # 参数
    /// - `capacities`: 职能 -> 可用 FTE
    pub fn capacity_gaps(
        &self,
        series: &[DemandSeries],
        capacities: &BTreeMap<String, f64>,
    ) -> BTreeMap<String, CapacityGap> {
        self.forecast_demand(series)
            .iter()
            .filter_map(|outcome| {
                let forecast = outcome.forecast()?;
                let capacity = capacities.get(&forecast.function)?;
                let gap = forecast.peak_gap(*capacity)?;
                Some((forecast.function.clone(), gap))
            })
            .collect()
    }

    // ==========================================
    // 聚类与告警
    // ==========================================

    pub fn cluster_projects(&self, scored: &[ScoredProject]) -> Option<ArchetypeResult> {
        self.clusterer.cluster(scored)
    }

    pub fn alerts(&self, scored: &[ScoredProject]) -> Vec<PortfolioAlert> {
        self.evaluator.alerts().evaluate(scored)
    }
}
