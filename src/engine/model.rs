// ==========================================
// 项目组合决策引擎 - 评分模型
// ==========================================
// 职责: 可插拔的预测能力（延期概率 + 完工成本 + 属性贡献）
// 完工成本: 已训练成本比率模型时用模型，否则用挣值公式
// 约定:
// - 延期概率 ∈ [0, 1]
// - 完工成本 >= 累计实际支出
// - 属性贡献之和 = 预测概率 - 基线概率
// ==========================================

use crate::domain::score::{AttributeContribution, FeatureName};
use crate::domain::types::DeliveryOutcome;
use crate::engine::cost_model::CostRatioModel;
use crate::engine::features::{cost_at_completion, feature_index, ProjectFeatures, FEATURE_COUNT};
use tracing::{debug, info};

// ==========================================
// ModelOutput - 模型输出
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub delay_probability: f64,
    pub baseline_delay_probability: f64,
    pub cost_at_completion: f64,
    pub contributions: Vec<AttributeContribution>,
}

// ==========================================
// Trait: ScoringModel
// ==========================================
// 实现者: LogisticRiskModel
// 引擎会校验输出是否满足约定，不满足的项目标记为不可评分
pub trait ScoringModel: Send + Sync {
    /// 模型名称（写入评分结果，便于追溯）
    fn model_name(&self) -> &str;

    /// 对单个项目做预测
    fn predict(&self, features: &ProjectFeatures) -> ModelOutput;

    /// 完工成本估算方式
    fn cost_estimator(&self) -> &str {
        "evm_formula"
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

// ==========================================
// LogisticRiskModel - 逻辑回归延期模型
// ==========================================
// 特征先按 (x - mean) / scale 标准化，基线项目即标准化后的零向量
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRiskModel {
    name: String,
    intercept: f64,
    weights: [f64; FEATURE_COUNT],
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
    /// 已训练的成本比率模型；None 时按挣值公式估算
    cost: Option<CostRatioModel>,
}

/// 训练样本: (特征, 交付结果)
pub type TrainingSample<'a> = (&'a ProjectFeatures, DeliveryOutcome);

const TRAIN_ITERATIONS: usize = 2000;
const TRAIN_LEARNING_RATE: f64 = 0.1;
const TRAIN_L2: f64 = 0.01;

impl LogisticRiskModel {
    /// 先验模型（无历史数据时使用）
    ///
    /// 均值/尺度取典型器械项目组合的量级，权重方向:
    /// 支出比例、进度滞后、资源负荷、风险数越高越易延期；历史按期率越高越不易延期
    pub fn prior() -> Self {
        let mut means = [0.0; FEATURE_COUNT];
        let mut scales = [1.0; FEATURE_COUNT];
        let mut weights = [0.0; FEATURE_COUNT];

        let table: [(FeatureName, f64, f64, f64); FEATURE_COUNT] = [
            // (特征, 均值, 尺度, 权重)
            (FeatureName::BudgetMillions, 3.0, 2.0, 0.20),
            (FeatureName::SpendRatio, 0.5, 0.3, 0.50),
            (FeatureName::ScheduleVariance, 0.05, 0.15, 0.90),
            (FeatureName::PhaseIndex, 0.4, 0.3, -0.20),
            (FeatureName::ResourceLoad, 8.0, 5.0, 0.30),
            (FeatureName::RiskCount, 4.0, 3.0, 0.60),
            (FeatureName::OnTimeRate, 0.8, 0.15, -0.70),
        ];
        for (feature, mean, scale, weight) in table {
            let i = feature_index(feature);
            means[i] = mean;
            scales[i] = scale;
            weights[i] = weight;
        }

        Self {
            name: "logistic_prior".to_string(),
            intercept: -0.6,
            weights,
            means,
            scales,
            cost: None,
        }
    }

    /// 挂接已训练的成本比率模型
    pub fn with_cost_model(mut self, cost: CostRatioModel) -> Self {
        self.cost = Some(cost);
        self
    }

    /// 基于历史已完成项目训练
    ///
    /// 类别加权平衡（延期/按期样本等权），L2 正则，固定步数梯度下降，结果可复现
    ///
    /// # 返回
    /// - Some(model): 训练成功
    /// - None: 样本数不足 min_samples，或只有一个类别
    pub fn fit(samples: &[TrainingSample<'_>], min_samples: usize) -> Option<Self> {
        let n = samples.len();
        let positives = samples
            .iter()
            .filter(|(_, o)| *o == DeliveryOutcome::Delayed)
            .count();
        let negatives = n - positives;

        if n < min_samples || positives == 0 || negatives == 0 {
            debug!(
                samples = n,
                positives = positives,
                negatives = negatives,
                "训练样本不足，跳过延期模型训练"
            );
            return None;
        }

        // 1. 标准化参数
        let prior = Self::prior();
        let mut means = [0.0; FEATURE_COUNT];
        let mut scales = [1.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            let mean = samples.iter().map(|(f, _)| f.vector.values[j]).sum::<f64>() / n as f64;
            let var = samples
                .iter()
                .map(|(f, _)| (f.vector.values[j] - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            means[j] = mean;
            let std = var.sqrt();
            scales[j] = if std.is_finite() && std > 1e-9 {
                std
            } else {
                prior.scales[j]
            };
        }

        let xs: Vec<[f64; FEATURE_COUNT]> = samples
            .iter()
            .map(|(f, _)| {
                let mut z = [0.0; FEATURE_COUNT];
                for j in 0..FEATURE_COUNT {
                    z[j] = (f.vector.values[j] - means[j]) / scales[j];
                }
                z
            })
            .collect();
        let ys: Vec<f64> = samples
            .iter()
            .map(|(_, o)| if *o == DeliveryOutcome::Delayed { 1.0 } else { 0.0 })
            .collect();

        // 2. 类别权重
        let w_pos = n as f64 / (2.0 * positives as f64);
        let w_neg = n as f64 / (2.0 * negatives as f64);

        // 3. 梯度下降
        let mut intercept = 0.0;
        let mut weights = [0.0; FEATURE_COUNT];
        for _ in 0..TRAIN_ITERATIONS {
            let mut grad_b = 0.0;
            let mut grad_w = [0.0; FEATURE_COUNT];
            for (x, y) in xs.iter().zip(&ys) {
                let logit = intercept
                    + weights
                        .iter()
                        .zip(x.iter())
                        .map(|(w, v)| w * v)
                        .sum::<f64>();
                let sample_weight = if *y > 0.5 { w_pos } else { w_neg };
                let err = (sigmoid(logit) - y) * sample_weight;
                grad_b += err;
                for j in 0..FEATURE_COUNT {
                    grad_w[j] += err * x[j];
                }
            }
            intercept -= TRAIN_LEARNING_RATE * grad_b / n as f64;
            for j in 0..FEATURE_COUNT {
                weights[j] -=
                    TRAIN_LEARNING_RATE * (grad_w[j] / n as f64 + TRAIN_L2 * weights[j]);
            }
        }

        info!(
            samples = n,
            positives = positives,
            intercept = intercept,
            "延期模型训练完成"
        );

        Some(Self {
            name: "logistic_fitted".to_string(),
            intercept,
            weights,
            means,
            scales,
            cost: None,
        })
    }

    fn standardize(&self, features: &ProjectFeatures) -> [f64; FEATURE_COUNT] {
        let mut z = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            z[j] = (features.vector.values[j] - self.means[j]) / self.scales[j];
        }
        z
    }

    /// 基线（总体平均项目）延期概率
    pub fn baseline_probability(&self) -> f64 {
        sigmoid(self.intercept)
    }

    pub fn weight(&self, feature: FeatureName) -> f64 {
        self.weights[feature_index(feature)]
    }
}

impl ScoringModel for LogisticRiskModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &ProjectFeatures) -> ModelOutput {
        let z = self.standardize(features);

        // logit 空间贡献可加
        let raw: Vec<f64> = (0..FEATURE_COUNT).map(|j| self.weights[j] * z[j]).collect();
        let delta_logit: f64 = raw.iter().sum();

        let p0 = self.baseline_probability();
        let p = sigmoid(self.intercept + delta_logit);

        // 按比例映射回概率空间，保证贡献之和 = p - p0
        let factor = if delta_logit.abs() > 1e-12 {
            (p - p0) / delta_logit
        } else {
            p0 * (1.0 - p0)
        };

        let contributions = FeatureName::ALL
            .iter()
            .map(|feature| {
                let j = feature_index(*feature);
                AttributeContribution {
                    feature: *feature,
                    value: features.vector.values[j],
                    contribution: raw[j] * factor,
                }
            })
            .collect();

        ModelOutput {
            delay_probability: p,
            baseline_delay_probability: p0,
            cost_at_completion: match &self.cost {
                Some(cost) => cost.estimate(features),
                None => cost_at_completion(
                    features.budget,
                    features.actual_spend,
                    features.earned_value,
                ),
            },
            contributions,
        }
    }

    fn cost_estimator(&self) -> &str {
        if self.cost.is_some() {
            "cost_ratio_fitted"
        } else {
            "evm_formula"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::EvmMetrics;
    use crate::domain::types::Phase;
    use crate::engine::features::FeatureVector;

    fn features(values: [f64; FEATURE_COUNT]) -> ProjectFeatures {
        ProjectFeatures {
            vector: FeatureVector { values },
            phase: Phase::Development,
            budget: values[0] * 1_000_000.0,
            actual_spend: values[0] * 1_000_000.0 * values[1],
            earned_value: values[0] * 1_000_000.0 * 0.5,
            elapsed_fraction: Some(0.5),
            evm: EvmMetrics { cpi: 1.0, spi: 1.0 },
        }
    }

    #[test]
    fn test_baseline_project_has_zero_contributions() {
        let model = LogisticRiskModel::prior();
        let out = model.predict(&features([3.0, 0.5, 0.05, 0.4, 8.0, 4.0, 0.8]));
        assert!((out.delay_probability - out.baseline_delay_probability).abs() < 1e-12);
        assert!(out.contributions.iter().all(|c| c.contribution.abs() < 1e-12));
    }

    #[test]
    fn test_contributions_sum_to_delta() {
        let model = LogisticRiskModel::prior();
        let out = model.predict(&features([9.0, 1.2, 0.4, 0.2, 20.0, 11.0, 0.4]));
        let sum: f64 = out.contributions.iter().map(|c| c.contribution).sum();
        assert!((sum - (out.delay_probability - out.baseline_delay_probability)).abs() < 1e-9);
        assert!(out.delay_probability > out.baseline_delay_probability);
        assert!((0.0..=1.0).contains(&out.delay_probability));
    }

    #[test]
    fn test_fit_requires_both_classes() {
        let a = features([1.0, 0.5, 0.0, 0.4, 5.0, 2.0, 0.9]);
        let samples: Vec<TrainingSample> = (0..6).map(|_| (&a, DeliveryOutcome::OnTime)).collect();
        assert!(LogisticRiskModel::fit(&samples, 5).is_none());
    }

    #[test]
    fn test_fit_learns_direction() {
        let late = features([5.0, 1.1, 0.4, 0.4, 12.0, 9.0, 0.5]);
        let late2 = features([6.0, 1.0, 0.3, 0.5, 14.0, 8.0, 0.55]);
        let ok = features([1.0, 0.4, 0.0, 0.4, 4.0, 1.0, 0.95]);
        let ok2 = features([1.5, 0.5, -0.05, 0.5, 5.0, 2.0, 0.9]);
        let samples: Vec<TrainingSample> = vec![
            (&late, DeliveryOutcome::Delayed),
            (&late2, DeliveryOutcome::Delayed),
            (&ok, DeliveryOutcome::OnTime),
            (&ok2, DeliveryOutcome::OnTime),
            (&late, DeliveryOutcome::Delayed),
            (&ok, DeliveryOutcome::OnTime),
        ];
        let model = LogisticRiskModel::fit(&samples, 5).unwrap();
        assert_eq!(model.model_name(), "logistic_fitted");
        let p_late = model.predict(&late).delay_probability;
        let p_ok = model.predict(&ok).delay_probability;
        assert!(p_late > p_ok);
        assert!(model.weight(FeatureName::RiskCount) > 0.0);
    }
}
