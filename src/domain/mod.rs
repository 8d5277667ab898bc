// ==========================================
// 项目组合决策引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含加载逻辑,不含引擎逻辑
// ==========================================

pub mod alert;
pub mod archetype;
pub mod forecast;
pub mod project;
pub mod scenario;
pub mod score;
pub mod selection;
pub mod types;

// 重导出核心类型
pub use alert::{AlertType, PortfolioAlert};
pub use archetype::{ArchetypeResult, ProjectArchetype};
pub use forecast::{
    CapacityGap, DemandPoint, DemandSeries, ForecastOutcome, ForecastPoint,
    ForecastUnavailableReason, ResourceForecast,
};
pub use project::Project;
pub use scenario::{Scenario, ScenarioAction, ScenarioOutcome};
pub use score::{
    AttributeContribution, BurnAnomaly, EvmMetrics, FeatureName, ProjectScore, ScoreOutcome,
    ScoreRecord, ScoredProject, UnavailableReason,
};
pub use selection::{ConstraintSet, SelectionResult};
pub use types::{AlertSeverity, DeliveryOutcome, ObjectiveKind, Phase, SelectionStatus};
