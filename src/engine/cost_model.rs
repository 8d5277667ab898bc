// ==========================================
// 项目组合决策引擎 - 完工成本比率模型
// ==========================================
// 职责: 由历史已完成项目学习 最终支出/预算 比率
// 方法: 标准化特征上的 L2 正则线性回归（固定步数梯度下降，结果可复现）
// 约定:
// - 输入特征不含由实际支出派生的量，预测比率与 AC 无关
// - EAC = max(预算 × 预测比率, AC)，因此 EAC >= AC 且随 AC 单调不减
// ==========================================

use crate::domain::score::FeatureName;
use crate::engine::features::{cost_at_completion, ProjectFeatures};
use tracing::{debug, info};

/// 参与成本比率回归的特征
pub const COST_FEATURES: [FeatureName; 6] = [
    FeatureName::BudgetMillions,
    FeatureName::ScheduleVariance,
    FeatureName::PhaseIndex,
    FeatureName::ResourceLoad,
    FeatureName::RiskCount,
    FeatureName::OnTimeRate,
];

const COST_INPUTS: usize = COST_FEATURES.len();

const TRAIN_ITERATIONS: usize = 2000;
const TRAIN_LEARNING_RATE: f64 = 0.1;
const TRAIN_L2: f64 = 0.01;

/// 预测比率上限（防止外推失控）
const MAX_COST_RATIO: f64 = 5.0;

/// 训练样本: (特征, 最终支出/预算)
pub type CostSample<'a> = (&'a ProjectFeatures, f64);

fn inputs(features: &ProjectFeatures) -> [f64; COST_INPUTS] {
    let mut x = [0.0; COST_INPUTS];
    for (slot, feature) in x.iter_mut().zip(COST_FEATURES) {
        *slot = features.vector.get(feature);
    }
    x
}

/// 历史项目的最终成本比率；预算为 0 或结果非有限值时不可用
pub fn final_cost_ratio(features: &ProjectFeatures) -> Option<f64> {
    if features.budget <= 0.0 {
        return None;
    }
    let ratio = features.actual_spend / features.budget;
    ratio.is_finite().then_some(ratio)
}

// ==========================================
// CostRatioModel
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct CostRatioModel {
    intercept: f64,
    weights: [f64; COST_INPUTS],
    means: [f64; COST_INPUTS],
    scales: [f64; COST_INPUTS],
}

impl CostRatioModel {
    /// 训练
    ///
    /// # 返回
    /// - Some(model): 训练成功
    /// - None: 样本数不足 min_samples（调用方回退到挣值公式）
    pub fn fit(samples: &[CostSample<'_>], min_samples: usize) -> Option<Self> {
        let n = samples.len();
        if n < min_samples.max(2) {
            debug!(samples = n, "训练样本不足，跳过成本比率模型训练");
            return None;
        }
        let nf = n as f64;

        let xs_raw: Vec<[f64; COST_INPUTS]> = samples.iter().map(|(f, _)| inputs(f)).collect();
        let ys: Vec<f64> = samples.iter().map(|(_, y)| *y).collect();

        // 1. 标准化参数（零方差特征尺度取 1，标准化后恒为 0，不参与拟合）
        let mut means = [0.0; COST_INPUTS];
        let mut scales = [1.0; COST_INPUTS];
        for j in 0..COST_INPUTS {
            let mean = xs_raw.iter().map(|x| x[j]).sum::<f64>() / nf;
            let var = xs_raw.iter().map(|x| (x[j] - mean).powi(2)).sum::<f64>() / (nf - 1.0);
            means[j] = mean;
            let std = var.sqrt();
            if std.is_finite() && std > 1e-9 {
                scales[j] = std;
            }
        }
        let xs: Vec<[f64; COST_INPUTS]> = xs_raw
            .iter()
            .map(|x| {
                let mut z = [0.0; COST_INPUTS];
                for j in 0..COST_INPUTS {
                    z[j] = (x[j] - means[j]) / scales[j];
                }
                z
            })
            .collect();

        // 2. 梯度下降（截距从样本均值起步）
        let mut intercept = ys.iter().sum::<f64>() / nf;
        let mut weights = [0.0; COST_INPUTS];
        for _ in 0..TRAIN_ITERATIONS {
            let mut grad_b = 0.0;
            let mut grad_w = [0.0; COST_INPUTS];
            for (x, y) in xs.iter().zip(&ys) {
                let pred = intercept
                    + weights
                        .iter()
                        .zip(x.iter())
                        .map(|(w, v)| w * v)
                        .sum::<f64>();
                let err = pred - y;
                grad_b += err;
                for j in 0..COST_INPUTS {
                    grad_w[j] += err * x[j];
                }
            }
            intercept -= TRAIN_LEARNING_RATE * grad_b / nf;
            for j in 0..COST_INPUTS {
                weights[j] -= TRAIN_LEARNING_RATE * (grad_w[j] / nf + TRAIN_L2 * weights[j]);
            }
        }

        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            debug!(samples = n, "成本比率模型发散，放弃训练结果");
            return None;
        }

        info!(samples = n, intercept = intercept, "成本比率模型训练完成");
        Some(Self {
            intercept,
            weights,
            means,
            scales,
        })
    }

    /// 预测最终成本比率，限制在 [0, MAX_COST_RATIO]
    pub fn predict_ratio(&self, features: &ProjectFeatures) -> f64 {
        let x = inputs(features);
        let mut value = self.intercept;
        for j in 0..COST_INPUTS {
            value += self.weights[j] * (x[j] - self.means[j]) / self.scales[j];
        }
        value.clamp(0.0, MAX_COST_RATIO)
    }

    /// 完工成本估算
    pub fn estimate(&self, features: &ProjectFeatures) -> f64 {
        let forecast = features.budget * self.predict_ratio(features);
        if !forecast.is_finite() {
            return cost_at_completion(features.budget, features.actual_spend, features.earned_value);
        }
        forecast.max(features.actual_spend)
    }

    pub fn weight(&self, feature: FeatureName) -> Option<f64> {
        COST_FEATURES
            .iter()
            .position(|f| *f == feature)
            .map(|j| self.weights[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::EvmMetrics;
    use crate::domain::types::Phase;
    use crate::engine::features::{FeatureVector, FEATURE_COUNT};

    /// values: [预算(百万), 支出比例, 进度偏差, 阶段, 资源负荷, 风险数, 按期率]
    fn features(values: [f64; FEATURE_COUNT]) -> ProjectFeatures {
        let budget = values[0] * 1_000_000.0;
        ProjectFeatures {
            vector: FeatureVector { values },
            phase: Phase::Launch,
            budget,
            actual_spend: budget * values[1],
            earned_value: budget,
            elapsed_fraction: Some(1.0),
            evm: EvmMetrics { cpi: 1.0, spi: 1.0 },
        }
    }

    fn history() -> Vec<ProjectFeatures> {
        // 风险数越多，最终超支越多
        (0..8)
            .map(|i| {
                let risks = 1.0 + i as f64;
                let ratio = 0.95 + 0.05 * risks;
                features([2.0, ratio, 0.1, 1.0, 6.0, risks, 0.8])
            })
            .collect()
    }

    #[test]
    fn test_fit_requires_min_samples() {
        let h = history();
        let samples: Vec<CostSample> = h[..3]
            .iter()
            .map(|f| (f, final_cost_ratio(f).unwrap()))
            .collect();
        assert!(CostRatioModel::fit(&samples, 5).is_none());
    }

    #[test]
    fn test_fit_learns_overrun_from_risk() {
        let h = history();
        let samples: Vec<CostSample> = h.iter().map(|f| (f, final_cost_ratio(f).unwrap())).collect();
        let model = CostRatioModel::fit(&samples, 5).unwrap();
        assert!(model.weight(FeatureName::RiskCount).unwrap() > 0.0);
        // 常量特征不产生权重
        assert_eq!(model.weight(FeatureName::BudgetMillions), Some(0.0));
        assert_eq!(model.weight(FeatureName::SpendRatio), None);

        let low = model.predict_ratio(&features([2.0, 0.3, 0.1, 0.4, 6.0, 1.0, 0.8]));
        let high = model.predict_ratio(&features([2.0, 0.3, 0.1, 0.4, 6.0, 8.0, 0.8]));
        assert!(high > low);
        assert!((high - 1.35).abs() < 0.05);
    }

    #[test]
    fn test_estimate_at_least_actual_and_monotone() {
        let h = history();
        let samples: Vec<CostSample> = h.iter().map(|f| (f, final_cost_ratio(f).unwrap())).collect();
        let model = CostRatioModel::fit(&samples, 5).unwrap();

        let mut prev = 0.0;
        for spend_ratio in [0.0, 0.5, 1.0, 1.5, 3.0, 10.0] {
            let f = features([2.0, spend_ratio, 0.1, 0.4, 6.0, 3.0, 0.8]);
            let eac = model.estimate(&f);
            assert!(eac >= f.actual_spend);
            assert!(eac >= prev);
            prev = eac;
        }
    }
}
