// ==========================================
// 项目组合决策引擎 - 项目原型聚类
// ==========================================
// 方法: 标准化后的 k-means（最远点初始化，结果可复现）
// 特征: 预算 / 风险数 / 资源负荷 / 战略价值 / 延期概率
// 仅已评分项目参与聚类
// ==========================================

use crate::domain::archetype::{ArchetypeResult, ProjectArchetype};
use crate::domain::score::ScoredProject;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

const DIMS: usize = 5;
const FEATURE_LABELS: [&str; DIMS] = [
    "budget",
    "risk_count",
    "resource_load",
    "strategic_value",
    "delay_probability",
];
const MAX_ITERATIONS: usize = 100;

type Row = [f64; DIMS];

fn sq_distance(a: &Row, b: &Row) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(row: &Row, centroids: &[Row]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = sq_distance(row, c);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

fn mean_of(rows: &[Row], members: &[usize]) -> Option<Row> {
    if members.is_empty() {
        return None;
    }
    let mut acc = [0.0; DIMS];
    for &m in members {
        for j in 0..DIMS {
            acc[j] += rows[m][j];
        }
    }
    for v in acc.iter_mut() {
        *v /= members.len() as f64;
    }
    Some(acc)
}

// ==========================================
// ArchetypeClusterer
// ==========================================
pub struct ArchetypeClusterer {
    k: usize,
}

impl ArchetypeClusterer {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// 聚类
    ///
    /// # 返回
    /// - Some(result)
    /// - None: k 为 0 或已评分项目数少于 k
    #[instrument(skip(self, projects), fields(k = self.k, projects = projects.len()))]
    pub fn cluster(&self, projects: &[ScoredProject]) -> Option<ArchetypeResult> {
        let mut ids = Vec::new();
        let mut raw: Vec<Row> = Vec::new();
        for sp in projects {
            let Some(score) = sp.record.score() else {
                continue;
            };
            let p = &sp.project;
            ids.push(p.project_id.clone());
            raw.push([
                p.budget.unwrap_or(0.0),
                p.risk_count.unwrap_or(0) as f64,
                p.total_fte(),
                p.strategic_value.unwrap_or(0.0),
                score.delay_probability,
            ]);
        }

        let n = raw.len();
        if self.k == 0 || n < self.k {
            debug!(scored = n, "已评分项目不足，不做聚类");
            return None;
        }

        // 1. 标准化
        let mut mean = [0.0; DIMS];
        let mut std = [1.0; DIMS];
        for j in 0..DIMS {
            mean[j] = raw.iter().map(|r| r[j]).sum::<f64>() / n as f64;
            let var = raw.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n as f64;
            if var.sqrt() > 1e-12 {
                std[j] = var.sqrt();
            }
        }
        let rows: Vec<Row> = raw
            .iter()
            .map(|r| {
                let mut z = [0.0; DIMS];
                for j in 0..DIMS {
                    z[j] = (r[j] - mean[j]) / std[j];
                }
                z
            })
            .collect();

        // 2. 最远点初始化（从第一个项目开始）
        let mut centroids: Vec<Row> = vec![rows[0]];
        while centroids.len() < self.k {
            let mut far = 0;
            let mut far_d = -1.0;
            for (i, r) in rows.iter().enumerate() {
                let d = centroids
                    .iter()
                    .map(|c| sq_distance(r, c))
                    .fold(f64::INFINITY, f64::min);
                if d > far_d {
                    far = i;
                    far_d = d;
                }
            }
            centroids.push(rows[far]);
        }

        // 3. Lloyd 迭代
        let mut assignment: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids)).collect();
        let mut iterations = 1;
        while iterations < MAX_ITERATIONS {
            for (c, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<usize> = (0..n).filter(|&i| assignment[i] == c).collect();
                if let Some(m) = mean_of(&rows, &members) {
                    *centroid = m;
                }
            }
            let next: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids)).collect();
            iterations += 1;
            if next == assignment {
                break;
            }
            assignment = next;
        }

        // 4. 输出（中心取原始单位均值）
        let mut archetypes = Vec::with_capacity(self.k);
        let mut assignments = BTreeMap::new();
        for c in 0..self.k {
            let members: Vec<usize> = (0..n).filter(|&i| assignment[i] == c).collect();
            let centroid = mean_of(&raw, &members)
                .map(|m| {
                    FEATURE_LABELS
                        .iter()
                        .zip(m.iter())
                        .map(|(name, v)| (name.to_string(), *v))
                        .collect()
                })
                .unwrap_or_default();
            for &m in &members {
                assignments.insert(ids[m].clone(), c);
            }
            archetypes.push(ProjectArchetype {
                archetype_id: c,
                label: format!("Archetype {}", c + 1),
                centroid,
                members: members.iter().map(|&m| ids[m].clone()).collect(),
            });
        }

        info!(iterations = iterations, "项目原型聚类完成");
        Some(ArchetypeResult {
            archetypes,
            assignments,
            iterations,
        })
    }
}
