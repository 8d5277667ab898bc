// ==========================================
// 项目组合决策引擎 - 支出燃烧率异常检测
// ==========================================
// 职责: 与同阶段其他项目比较燃烧指数，标记偏离过大的项目
// 方法: 留一法 z 分数（自身不参与同组均值/标准差）
// ==========================================

use crate::domain::score::BurnAnomaly;
use crate::domain::types::Phase;
use std::collections::HashMap;
use tracing::debug;

/// 单个样本（批次内下标 + 阶段 + 燃烧指数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnSample {
    pub index: usize,
    pub phase: Phase,
    pub burn_index: f64,
}

/// 组内离散度下限（相对均值量级）
const MIN_RELATIVE_STD: f64 = 1e-9;

// ==========================================
// BurnAnomalyDetector
// ==========================================
pub struct BurnAnomalyDetector {
    threshold_sd: f64,
    min_cohort: usize,
}

impl BurnAnomalyDetector {
    /// # 参数
    /// - `threshold_sd`: |z| 超过该值判为异常
    /// - `min_cohort`: 同阶段其他项目最少数量，不足时不给出结论
    pub fn new(threshold_sd: f64, min_cohort: usize) -> Self {
        Self {
            threshold_sd,
            min_cohort,
        }
    }

    /// 批量检测
    ///
    /// # 返回
    /// 样本下标 -> 检测结果；同组样本不足或组内无离散度的样本不出现在结果中
    pub fn detect(&self, samples: &[BurnSample]) -> HashMap<usize, BurnAnomaly> {
        let mut cohorts: HashMap<Phase, Vec<usize>> = HashMap::new();
        for (pos, s) in samples.iter().enumerate() {
            cohorts.entry(s.phase).or_default().push(pos);
        }

        let mut results = HashMap::new();
        for (pos, s) in samples.iter().enumerate() {
            let Some(members) = cohorts.get(&s.phase) else {
                continue;
            };
            let others = members.len() - 1;
            if others < self.min_cohort.max(2) {
                continue;
            }

            // 组规模很小，两遍法计算留一均值/方差
            let peers: Vec<f64> = members
                .iter()
                .filter(|&&m| m != pos)
                .map(|&m| samples[m].burn_index)
                .collect();
            let n = others as f64;
            let mean = peers.iter().sum::<f64>() / n;
            let var = peers.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
            let std = var.sqrt();
            if !std.is_finite() || std <= MIN_RELATIVE_STD * mean.abs().max(1.0) {
                continue;
            }

            let z = (s.burn_index - mean) / std;
            let is_anomalous = z.abs() > self.threshold_sd;
            if is_anomalous {
                debug!(
                    index = s.index,
                    phase = %s.phase,
                    burn_index = s.burn_index,
                    z_score = z,
                    "支出燃烧率异常"
                );
            }

            results.insert(
                s.index,
                BurnAnomaly {
                    burn_index: s.burn_index,
                    cohort_mean: mean,
                    cohort_std: std,
                    cohort_size: others,
                    z_score: z,
                    is_anomalous,
                },
            );
        }
        results
    }
}
