// ==========================================
// 项目组合决策引擎 - 特征工程
// ==========================================
// 职责: 校验项目属性并生成模型特征
// 输入: Project + 评估日期
// 输出: ProjectFeatures 或不可评分原因码
// ==========================================
// 五类属性: 预算 / 进度偏差 / 阶段 / 资源负荷 / 历史绩效
// ==========================================

use crate::domain::project::Project;
use crate::domain::score::{EvmMetrics, FeatureName, UnavailableReason};
use crate::domain::types::Phase;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = FeatureName::ALL.len();

/// 特征在向量中的位置
pub fn feature_index(feature: FeatureName) -> usize {
    match feature {
        FeatureName::BudgetMillions => 0,
        FeatureName::SpendRatio => 1,
        FeatureName::ScheduleVariance => 2,
        FeatureName::PhaseIndex => 3,
        FeatureName::ResourceLoad => 4,
        FeatureName::RiskCount => 5,
        FeatureName::OnTimeRate => 6,
    }
}

// ==========================================
// FeatureVector - 模型输入向量
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn get(&self, feature: FeatureName) -> f64 {
        self.values[feature_index(feature)]
    }

    pub fn set(&mut self, feature: FeatureName, value: f64) {
        self.values[feature_index(feature)] = value;
    }
}

// ==========================================
// ProjectFeatures - 单项目特征
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFeatures {
    pub vector: FeatureVector,
    pub phase: Phase,

    // ===== 财务原值（成本预测使用）=====
    pub budget: f64,
    pub actual_spend: f64,
    pub earned_value: f64,

    /// 已过工期比例；评估日早于计划开始时为 None
    pub elapsed_fraction: Option<f64>,

    pub evm: EvmMetrics,
}

impl ProjectFeatures {
    /// 支出燃烧指数 = 支出比例 / 已过工期比例
    pub fn burn_index(&self) -> Option<f64> {
        let elapsed = self.elapsed_fraction?;
        if elapsed <= 0.0 {
            return None;
        }
        let idx = self.vector.get(FeatureName::SpendRatio) / elapsed;
        idx.is_finite().then_some(idx)
    }
}

// ==========================================
// 完工成本估算 (EAC)
// ==========================================
// EAC = AC + max(BAC - EV, 0) × max(1, AC / EV)
// - 剩余工作按历史成本效率估算，不假设未来比计划更省
// - EV <= 0 时无法估算剩余效率，取 EAC = AC
// 性质: EAC >= AC；其余不变时随 AC 单调不减
pub fn cost_at_completion(budget: f64, actual_spend: f64, earned_value: f64) -> f64 {
    if earned_value <= 0.0 {
        return actual_spend;
    }
    let inefficiency = (actual_spend / earned_value).max(1.0);
    let remaining = (budget - earned_value).max(0.0);
    actual_spend + remaining * inefficiency
}

// ==========================================
// FeatureExtractor - 特征抽取器
// ==========================================
pub struct FeatureExtractor {
    // 无状态
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验项目属性并生成特征
    ///
    /// # 参数
    /// - `project`: 项目记录
    /// - `as_of`: 评估日期（进度偏差、已过工期均相对该日期计算）
    ///
    /// # 返回
    /// - Ok(ProjectFeatures)
    /// - Err(UnavailableReason): 缺失或非法属性（首个问题）
    pub fn extract(
        &self,
        project: &Project,
        as_of: NaiveDate,
    ) -> Result<ProjectFeatures, UnavailableReason> {
        if project.project_id.trim().is_empty() {
            return Err(missing("project_id"));
        }

        // 1. 财务
        let budget = non_negative("budget", required("budget", project.budget)?)?;
        let actual_spend =
            non_negative("actual_spend", required("actual_spend", project.actual_spend)?)?;
        let reported_ev = optional_non_negative("earned_value", project.earned_value)?;
        let reported_pv = optional_non_negative("planned_value", project.planned_value)?;

        let spend_ratio = if budget > 0.0 {
            actual_spend / budget
        } else if actual_spend == 0.0 {
            0.0
        } else {
            return Err(UnavailableReason::OutOfRange {
                field: "budget".to_string(),
                value: budget,
            });
        };

        // 2. 进度
        let planned_start = project.planned_start.ok_or_else(|| missing("planned_start"))?;
        let planned_end = project.planned_end.ok_or_else(|| missing("planned_end"))?;
        let duration_days = (planned_end - planned_start).num_days();
        if duration_days <= 0 {
            return Err(UnavailableReason::InvalidSchedule {
                detail: format!(
                    "planned_end ({}) 不晚于 planned_start ({})",
                    planned_end, planned_start
                ),
            });
        }
        let duration = duration_days as f64;

        let phase = project.phase.ok_or_else(|| missing("phase"))?;

        // 未上市且已过预测完成日的项目，至少滞后到评估日
        let mut effective_end = project.forecast_end.unwrap_or(planned_end);
        if phase != Phase::Launch && as_of > effective_end {
            effective_end = as_of;
        }
        let schedule_variance = (effective_end - planned_end).num_days() as f64 / duration;

        let elapsed_days = (as_of - planned_start).num_days();
        let elapsed_fraction = (elapsed_days > 0).then(|| elapsed_days as f64 / duration);

        // 3. 资源
        for (function, fte) in &project.allocations {
            if function.trim().is_empty() {
                return Err(missing("allocations.function"));
            }
            non_negative(&format!("allocations[{}]", function), *fte)?;
        }
        let resource_load = project.total_fte();

        // 4. 风险与历史绩效
        let risk_count = project.risk_count.ok_or_else(|| missing("risk_count"))?;
        if risk_count < 0 {
            return Err(UnavailableReason::NegativeValue {
                field: "risk_count".to_string(),
            });
        }
        non_negative(
            "strategic_value",
            required("strategic_value", project.strategic_value)?,
        )?;
        let on_time_rate = required("on_time_rate", project.on_time_rate)?;
        if !(0.0..=1.0).contains(&on_time_rate) {
            return Err(UnavailableReason::OutOfRange {
                field: "on_time_rate".to_string(),
                value: on_time_rate,
            });
        }

        // 5. 挣值
        let earned_value = reported_ev.unwrap_or(budget * phase.nominal_progress());
        let planned_value = reported_pv
            .unwrap_or_else(|| budget * elapsed_fraction.unwrap_or(0.0).min(1.0));
        let evm = EvmMetrics {
            cpi: if actual_spend > 0.0 {
                earned_value / actual_spend
            } else {
                1.0
            },
            spi: if planned_value > 0.0 {
                earned_value / planned_value
            } else {
                1.0
            },
        };

        let mut vector = FeatureVector {
            values: [0.0; FEATURE_COUNT],
        };
        vector.set(FeatureName::BudgetMillions, budget / 1_000_000.0);
        vector.set(FeatureName::SpendRatio, spend_ratio);
        vector.set(FeatureName::ScheduleVariance, schedule_variance);
        vector.set(FeatureName::PhaseIndex, phase.normalized());
        vector.set(FeatureName::ResourceLoad, resource_load);
        vector.set(FeatureName::RiskCount, risk_count as f64);
        vector.set(FeatureName::OnTimeRate, on_time_rate);

        Ok(ProjectFeatures {
            vector,
            phase,
            budget,
            actual_spend,
            earned_value,
            elapsed_fraction,
            evm,
        })
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(field: &str) -> UnavailableReason {
    UnavailableReason::MissingAttribute {
        field: field.to_string(),
    }
}

fn required(field: &str, value: Option<f64>) -> Result<f64, UnavailableReason> {
    let v = value.ok_or_else(|| missing(field))?;
    if !v.is_finite() {
        return Err(UnavailableReason::NonFiniteValue {
            field: field.to_string(),
        });
    }
    Ok(v)
}

fn non_negative(field: &str, value: f64) -> Result<f64, UnavailableReason> {
    if !value.is_finite() {
        return Err(UnavailableReason::NonFiniteValue {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(UnavailableReason::NegativeValue {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn optional_non_negative(field: &str, value: Option<f64>) -> Result<Option<f64>, UnavailableReason> {
    value.map(|v| non_negative(field, v)).transpose()
}
