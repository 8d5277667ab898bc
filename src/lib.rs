// ==========================================
// 项目组合决策引擎 - 核心库
// ==========================================
// 系统定位: 决策支持（预测评分 + 组合优化），最终资助决定由人做出
// 技术栈: Rust + tokio
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 评分/预测/优化
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 引擎配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AlertSeverity, DeliveryOutcome, ObjectiveKind, Phase, SelectionStatus};

// 领域实体
pub use domain::{
    ConstraintSet, DemandSeries, ForecastOutcome, Project, ProjectScore, Scenario,
    ScenarioAction, ScenarioOutcome, ScoreRecord, ScoredProject, SelectionResult,
};

// 引擎
pub use engine::{
    AlertEngine, ArchetypeClusterer, DemandForecaster, EngineError, LogisticRiskModel,
    PortfolioOptimizer, ScenarioEvaluator, ScoringEngine, ScoringModel,
};

// API
pub use api::{ApiError, PortfolioApi};

// 配置
pub use config::{ConfigManager, EngineConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "项目组合决策引擎";
