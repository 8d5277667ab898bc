// ==========================================
// 项目组合决策引擎 - 预测评分引擎
// ==========================================
// 职责: 批量计算延期概率、完工成本、属性贡献与燃烧率异常
// 输入: 项目表 + 评估日期
// 输出: 与输入等长、同序的 ScoreRecord 列表
// ==========================================
// 约定:
// - 单个项目不可评分不影响其他项目
// - 项目ID重复时，首次出现的记录正常评分，后续记录标记为不可评分
// - 模型输出不满足约定时，该项目标记为 MODEL_OUTPUT_INVALID
// ==========================================

use crate::config::EngineConfig;
use crate::domain::project::Project;
use crate::domain::score::{ProjectScore, ScoreOutcome, ScoreRecord, UnavailableReason};
use crate::engine::anomaly::{BurnAnomalyDetector, BurnSample};
use crate::engine::cost_model::{final_cost_ratio, CostRatioModel, CostSample};
use crate::engine::features::{FeatureExtractor, ProjectFeatures};
use crate::engine::model::{LogisticRiskModel, ModelOutput, ScoringModel, TrainingSample};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const CONTRIBUTION_TOLERANCE: f64 = 1e-6;

// ==========================================
// ScoringEngine - 评分引擎
// ==========================================
pub struct ScoringEngine {
    model: Arc<dyn ScoringModel>,
    extractor: FeatureExtractor,
    anomaly: BurnAnomalyDetector,
}

impl ScoringEngine {
    /// 使用指定模型创建评分引擎
    pub fn new(model: Arc<dyn ScoringModel>, config: &EngineConfig) -> Self {
        Self {
            model,
            extractor: FeatureExtractor::new(),
            anomaly: BurnAnomalyDetector::new(config.anomaly_threshold_sd, config.anomaly_min_cohort),
        }
    }

    /// 使用先验模型创建评分引擎
    pub fn with_prior_model(config: &EngineConfig) -> Self {
        Self::new(Arc::new(LogisticRiskModel::prior()), config)
    }

    /// 基于历史已完成项目训练模型后创建评分引擎
    ///
    /// 延期模型样本不足时回退到先验模型；成本比率模型样本不足时回退到挣值公式
    ///
    /// # 参数
    /// - `history`: 历史项目（仅 final_outcome 已填写且属性完整的项目参与训练）
    /// - `as_of`: 特征计算日期
    #[instrument(skip(history, config), fields(history = history.len()))]
    pub fn train(history: &[Project], as_of: NaiveDate, config: &EngineConfig) -> Self {
        let extractor = FeatureExtractor::new();
        let labelled: Vec<(ProjectFeatures, _)> = history
            .iter()
            .filter_map(|p| {
                let outcome = p.final_outcome?;
                match extractor.extract(p, as_of) {
                    Ok(features) => Some((features, outcome)),
                    Err(reason) => {
                        debug!(project_id = %p.project_id, reason = %reason, "历史项目跳过训练");
                        None
                    }
                }
            })
            .collect();

        let samples: Vec<TrainingSample<'_>> = labelled.iter().map(|(f, o)| (f, *o)).collect();
        let model = match LogisticRiskModel::fit(&samples, config.min_training_samples) {
            Some(model) => model,
            None => {
                info!(samples = samples.len(), "使用先验延期模型");
                LogisticRiskModel::prior()
            }
        };

        // 完工成本比率（最终支出 / 预算）
        let cost_samples: Vec<CostSample<'_>> = labelled
            .iter()
            .filter_map(|(f, _)| final_cost_ratio(f).map(|ratio| (f, ratio)))
            .collect();
        let model = match CostRatioModel::fit(&cost_samples, config.min_training_samples) {
            Some(cost) => model.with_cost_model(cost),
            None => {
                info!(samples = cost_samples.len(), "完工成本使用挣值公式");
                model
            }
        };

        Self::new(Arc::new(model), config)
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn cost_estimator(&self) -> &str {
        self.model.cost_estimator()
    }

    /// 批量评分
    ///
    /// # 参数
    /// - `projects`: 项目表
    /// - `as_of`: 评估日期
    ///
    /// # 返回
    /// 与输入等长、同序的评分记录
    #[instrument(skip(self, projects), fields(projects = projects.len(), model = self.model.model_name()))]
    pub fn score(&self, projects: &[Project], as_of: NaiveDate) -> Vec<ScoreRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut records = Vec::with_capacity(projects.len());
        let mut burn_samples = Vec::new();

        for (idx, project) in projects.iter().enumerate() {
            if !project.project_id.trim().is_empty() && !seen.insert(project.project_id.as_str()) {
                warn!(project_id = %project.project_id, "项目ID重复，后续记录不评分");
                records.push(ScoreRecord::unavailable(
                    &project.project_id,
                    UnavailableReason::DuplicateProjectId,
                ));
                continue;
            }

            let features = match self.extractor.extract(project, as_of) {
                Ok(f) => f,
                Err(reason) => {
                    debug!(project_id = %project.project_id, reason = %reason, "项目不可评分");
                    records.push(ScoreRecord::unavailable(&project.project_id, reason));
                    continue;
                }
            };

            let output = self.model.predict(&features);
            if let Err(detail) = verify_output(&output, &features) {
                warn!(project_id = %project.project_id, detail = %detail, "模型输出不满足约定");
                records.push(ScoreRecord::unavailable(
                    &project.project_id,
                    UnavailableReason::ModelOutputInvalid { detail },
                ));
                continue;
            }

            if let Some(burn_index) = features.burn_index() {
                burn_samples.push(BurnSample {
                    index: idx,
                    phase: features.phase,
                    burn_index,
                });
            }

            records.push(ScoreRecord {
                project_id: project.project_id.clone(),
                outcome: ScoreOutcome::Scored(ProjectScore {
                    delay_probability: output.delay_probability,
                    baseline_delay_probability: output.baseline_delay_probability,
                    cost_at_completion: output.cost_at_completion,
                    contributions: output.contributions,
                    evm: features.evm,
                    model_name: self.model.model_name().to_string(),
                }),
                burn_anomaly: None,
            });
        }

        // 燃烧率异常（仅已评分项目参与同阶段比较）
        let anomalies = self.anomaly.detect(&burn_samples);
        let anomalous = anomalies.values().filter(|a| a.is_anomalous).count();
        for (idx, anomaly) in anomalies {
            records[idx].burn_anomaly = Some(anomaly);
        }

        let scored = records.iter().filter(|r| r.is_scored()).count();
        info!(
            scored = scored,
            unavailable = records.len() - scored,
            anomalous = anomalous,
            "批量评分完成"
        );
        records
    }
}

/// 校验模型输出
fn verify_output(output: &ModelOutput, features: &ProjectFeatures) -> Result<(), String> {
    let p = output.delay_probability;
    let p0 = output.baseline_delay_probability;
    if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
        return Err(format!("delay_probability={}", p));
    }
    if !(p0.is_finite() && (0.0..=1.0).contains(&p0)) {
        return Err(format!("baseline_delay_probability={}", p0));
    }
    let cost = output.cost_at_completion;
    if !cost.is_finite() || cost < features.actual_spend {
        return Err(format!(
            "cost_at_completion={} < actual_spend={}",
            cost, features.actual_spend
        ));
    }
    if output.contributions.iter().any(|c| !c.contribution.is_finite()) {
        return Err("contribution 非有限值".to_string());
    }
    let sum: f64 = output.contributions.iter().map(|c| c.contribution).sum();
    if (sum - (p - p0)).abs() > CONTRIBUTION_TOLERANCE {
        return Err(format!("贡献之和 {} 与概率差 {} 不一致", sum, p - p0));
    }
    Ok(())
}
