// ==========================================
// 项目组合决策引擎 - 引擎层
// ==========================================
// 职责: 预测评分、需求预测、聚类、告警、组合优化、情景评估
// 红线: 引擎均为纯计算，无 I/O，不持有可变共享状态
// 红线: 所有不可评分/不可行结果必须携带原因
// ==========================================

pub mod alerts;
pub mod anomaly;
pub mod clustering;
pub mod cost_model;
pub mod error;
pub mod features;
pub mod forecast;
pub mod model;
pub mod optimizer;
pub mod scenario;
pub mod scoring;

// 重导出核心引擎
pub use alerts::AlertEngine;
pub use anomaly::{BurnAnomalyDetector, BurnSample};
pub use clustering::ArchetypeClusterer;
pub use cost_model::CostRatioModel;
pub use error::{EngineError, EngineResult};
pub use features::{cost_at_completion, FeatureExtractor, FeatureVector, ProjectFeatures};
pub use forecast::DemandForecaster;
pub use model::{LogisticRiskModel, ModelOutput, ScoringModel};
pub use optimizer::PortfolioOptimizer;
pub use scenario::ScenarioEvaluator;
pub use scoring::ScoringEngine;
