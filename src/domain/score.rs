// ==========================================
// 项目组合决策引擎 - 评分领域模型
// ==========================================
// 用途: 评分引擎的输出，按项目ID关联，每次评分重新计算，不落库
// ==========================================

use crate::domain::project::Project;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 特征名称 (Feature Name)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    BudgetMillions,    // 预算规模（百万）
    SpendRatio,        // 支出/预算
    ScheduleVariance,  // 进度偏差（滞后天数/计划工期）
    PhaseIndex,        // 阶段序号（归一化）
    ResourceLoad,      // 投入 FTE 总量
    RiskCount,         // 未关闭风险数
    OnTimeRate,        // 历史按期交付率
}

impl FeatureName {
    pub const ALL: [FeatureName; 7] = [
        FeatureName::BudgetMillions,
        FeatureName::SpendRatio,
        FeatureName::ScheduleVariance,
        FeatureName::PhaseIndex,
        FeatureName::ResourceLoad,
        FeatureName::RiskCount,
        FeatureName::OnTimeRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::BudgetMillions => "budget_millions",
            FeatureName::SpendRatio => "spend_ratio",
            FeatureName::ScheduleVariance => "schedule_variance",
            FeatureName::PhaseIndex => "phase_index",
            FeatureName::ResourceLoad => "resource_load",
            FeatureName::RiskCount => "risk_count",
            FeatureName::OnTimeRate => "on_time_rate",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 不可评分原因码 (Unavailable Reason)
// ==========================================
// 单个项目失败不影响整批
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailableReason {
    MissingAttribute { field: String },
    NonFiniteValue { field: String },
    NegativeValue { field: String },
    OutOfRange { field: String, value: f64 },
    InvalidSchedule { detail: String },
    DuplicateProjectId,
    ModelOutputInvalid { detail: String },
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::MissingAttribute { field } => {
                write!(f, "MISSING_ATTRIBUTE: {}", field)
            }
            UnavailableReason::NonFiniteValue { field } => write!(f, "NON_FINITE_VALUE: {}", field),
            UnavailableReason::NegativeValue { field } => write!(f, "NEGATIVE_VALUE: {}", field),
            UnavailableReason::OutOfRange { field, value } => {
                write!(f, "OUT_OF_RANGE: {}={}", field, value)
            }
            UnavailableReason::InvalidSchedule { detail } => {
                write!(f, "INVALID_SCHEDULE: {}", detail)
            }
            UnavailableReason::DuplicateProjectId => write!(f, "DUPLICATE_PROJECT_ID"),
            UnavailableReason::ModelOutputInvalid { detail } => {
                write!(f, "MODEL_OUTPUT_INVALID: {}", detail)
            }
        }
    }
}

// ==========================================
// AttributeContribution - 属性贡献
// ==========================================
// 相对基线（总体平均项目）的边际贡献，概率空间，可加
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeContribution {
    pub feature: FeatureName,
    pub value: f64,        // 该项目的特征原值
    pub contribution: f64, // 对延期概率的贡献（带符号）
}

// ==========================================
// EvmMetrics - 挣值指标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvmMetrics {
    pub cpi: f64, // 成本绩效指数 EV/AC
    pub spi: f64, // 进度绩效指数 EV/PV
}

// ==========================================
// BurnAnomaly - 支出燃烧率异常
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnAnomaly {
    pub burn_index: f64,     // 支出比例 / 已过工期比例
    pub cohort_mean: f64,    // 同阶段其他项目均值
    pub cohort_std: f64,     // 同阶段其他项目标准差
    pub cohort_size: usize,  // 参与比较的项目数（不含自身）
    pub z_score: f64,
    pub is_anomalous: bool,
}

// ==========================================
// ProjectScore - 评分结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectScore {
    pub delay_probability: f64,          // 预测延期概率 (0~1)
    pub baseline_delay_probability: f64, // 基线项目延期概率
    pub cost_at_completion: f64,         // 预测完工成本 (>= actual_spend)
    pub contributions: Vec<AttributeContribution>,
    pub evm: EvmMetrics,
    pub model_name: String,
}

impl ProjectScore {
    /// 贡献之和（应等于 delay_probability - baseline_delay_probability）
    pub fn contribution_sum(&self) -> f64 {
        self.contributions.iter().map(|c| c.contribution).sum()
    }

    /// 按贡献绝对值降序排列的主要驱动因素
    pub fn top_drivers(&self, n: usize) -> Vec<&AttributeContribution> {
        let mut drivers: Vec<&AttributeContribution> = self.contributions.iter().collect();
        drivers.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.feature.cmp(&b.feature))
        });
        drivers.truncate(n);
        drivers
    }
}

// ==========================================
// ScoreOutcome / ScoreRecord
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreOutcome {
    Scored(ProjectScore),
    Unavailable { reason: UnavailableReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub project_id: String,
    pub outcome: ScoreOutcome,
    /// 同阶段样本不足或无法计算时为 None
    pub burn_anomaly: Option<BurnAnomaly>,
}

impl ScoreRecord {
    pub fn unavailable(project_id: &str, reason: UnavailableReason) -> Self {
        Self {
            project_id: project_id.to_string(),
            outcome: ScoreOutcome::Unavailable { reason },
            burn_anomaly: None,
        }
    }

    pub fn score(&self) -> Option<&ProjectScore> {
        match &self.outcome {
            ScoreOutcome::Scored(score) => Some(score),
            ScoreOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score().is_some()
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match &self.outcome {
            ScoreOutcome::Scored(_) => None,
            ScoreOutcome::Unavailable { reason } => Some(reason),
        }
    }

    pub fn is_anomalous(&self) -> bool {
        self.burn_anomaly
            .as_ref()
            .map(|a| a.is_anomalous)
            .unwrap_or(false)
    }
}

// ==========================================
// ScoredProject - 优化引擎输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProject {
    pub project: Project,
    pub record: ScoreRecord,
}

impl ScoredProject {
    /// 将项目表与评分结果按顺序配对
    pub fn zip(projects: &[Project], records: Vec<ScoreRecord>) -> Vec<ScoredProject> {
        projects
            .iter()
            .cloned()
            .zip(records)
            .map(|(project, record)| ScoredProject { project, record })
            .collect()
    }

    /// 同 zip，但接管项目表所有权
    pub fn pair(projects: Vec<Project>, records: Vec<ScoreRecord>) -> Vec<ScoredProject> {
        projects
            .into_iter()
            .zip(records)
            .map(|(project, record)| ScoredProject { project, record })
            .collect()
    }

    pub fn project_id(&self) -> &str {
        &self.project.project_id
    }
}
