// ==========================================
// 项目组合决策引擎 - 领域类型定义
// ==========================================
// 阶段、交付结果、优化目标、求解状态等枚举
// 序列化格式: SCREAMING_SNAKE_CASE
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 项目阶段 (Phase)
// ==========================================
// 有序枚举: Concept < Feasibility < Development < Verification < Transfer < Launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Concept,      // 概念
    Feasibility,  // 可行性
    Development,  // 开发
    Verification, // 验证与确认 (V&V)
    Transfer,     // 设计转移
    Launch,       // 上市
}

impl Phase {
    /// 全部阶段（按顺序）
    pub const ALL: [Phase; 6] = [
        Phase::Concept,
        Phase::Feasibility,
        Phase::Development,
        Phase::Verification,
        Phase::Transfer,
        Phase::Launch,
    ];

    /// 阶段序号 (0 ~ 5)
    pub fn ordinal(&self) -> usize {
        match self {
            Phase::Concept => 0,
            Phase::Feasibility => 1,
            Phase::Development => 2,
            Phase::Verification => 3,
            Phase::Transfer => 4,
            Phase::Launch => 5,
        }
    }

    /// 归一化阶段序号 (0.0 ~ 1.0)
    pub fn normalized(&self) -> f64 {
        self.ordinal() as f64 / (Phase::ALL.len() - 1) as f64
    }

    /// 阶段对应的名义完工比例
    ///
    /// 未上报挣值时，用于推算 EV = BAC × progress
    pub fn nominal_progress(&self) -> f64 {
        match self {
            Phase::Concept => 0.10,
            Phase::Feasibility => 0.25,
            Phase::Development => 0.50,
            Phase::Verification => 0.75,
            Phase::Transfer => 0.90,
            Phase::Launch => 1.00,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Concept => write!(f, "CONCEPT"),
            Phase::Feasibility => write!(f, "FEASIBILITY"),
            Phase::Development => write!(f, "DEVELOPMENT"),
            Phase::Verification => write!(f, "VERIFICATION"),
            Phase::Transfer => write!(f, "TRANSFER"),
            Phase::Launch => write!(f, "LAUNCH"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concept" => Ok(Phase::Concept),
            "feasibility" => Ok(Phase::Feasibility),
            "development" => Ok(Phase::Development),
            "verification" | "v&v" | "vv" => Ok(Phase::Verification),
            "transfer" | "design transfer" => Ok(Phase::Transfer),
            "launch" | "launched" => Ok(Phase::Launch),
            other => Err(format!("未知项目阶段: {}", other)),
        }
    }
}

// ==========================================
// 交付结果 (Delivery Outcome)
// ==========================================
// 仅历史已完成项目填写，用于训练延期模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    OnTime,  // 按期
    Delayed, // 延期
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::OnTime => write!(f, "ON_TIME"),
            DeliveryOutcome::Delayed => write!(f, "DELAYED"),
        }
    }
}

impl std::str::FromStr for DeliveryOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "on time" | "ontime" => Ok(DeliveryOutcome::OnTime),
            "delayed" | "late" => Ok(DeliveryOutcome::Delayed),
            other => Err(format!("未知交付结果: {}", other)),
        }
    }
}

// ==========================================
// 优化目标 (Objective)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    MaximizeStrategicValue,  // 最大化战略价值
    MinimizeRisk,            // 最小化预测风险
    MaximizeOnStrategyCount, // 最大化战略对齐项目数
}

impl ObjectiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveKind::MaximizeStrategicValue => "maximize_strategic_value",
            ObjectiveKind::MinimizeRisk => "minimize_risk",
            ObjectiveKind::MaximizeOnStrategyCount => "maximize_on_strategy_count",
        }
    }

    /// 是否为最小化目标（内部统一转换为最大化求解）
    pub fn is_minimize(&self) -> bool {
        matches!(self, ObjectiveKind::MinimizeRisk)
    }
}

impl Default for ObjectiveKind {
    fn default() -> Self {
        ObjectiveKind::MaximizeStrategicValue
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ObjectiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "maximize_strategic_value" | "max_value" => Ok(ObjectiveKind::MaximizeStrategicValue),
            "minimize_risk" | "min_risk" => Ok(ObjectiveKind::MinimizeRisk),
            "maximize_on_strategy_count" | "max_on_strategy" => {
                Ok(ObjectiveKind::MaximizeOnStrategyCount)
            }
            other => Err(format!("未知优化目标: {}", other)),
        }
    }
}

// ==========================================
// 求解状态 (Selection Status)
// ==========================================
// Infeasible 与 TimedOut 区分: 超时意味着可行性未知
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    Optimal,    // 最优解
    Infeasible, // 约束不可满足
    TimedOut,   // 求解超时
}

impl fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStatus::Optimal => write!(f, "OPTIMAL"),
            SelectionStatus::Infeasible => write!(f, "INFEASIBLE"),
            SelectionStatus::TimedOut => write!(f, "TIMED_OUT"),
        }
    }
}

// ==========================================
// 告警级别 (Alert Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,     // 提示
    Warning,  // 关注
    Critical, // 严重
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "INFO"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_and_parse() {
        assert!(Phase::Concept < Phase::Launch);
        assert_eq!("V&V".parse::<Phase>().unwrap(), Phase::Verification);
        assert!("Remediation".parse::<Phase>().is_err());
        assert_eq!(Phase::Launch.normalized(), 1.0);
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!("On Time".parse::<DeliveryOutcome>().unwrap(), DeliveryOutcome::OnTime);
        assert_eq!("Delayed".parse::<DeliveryOutcome>().unwrap(), DeliveryOutcome::Delayed);
    }

    #[test]
    fn test_objective_parse() {
        assert_eq!(
            "minimize-risk".parse::<ObjectiveKind>().unwrap(),
            ObjectiveKind::MinimizeRisk
        );
        assert!(ObjectiveKind::MinimizeRisk.is_minimize());
    }
}
