// ==========================================
// 项目组合决策引擎 - 项目领域模型
// ==========================================
// 用途: 引擎只读输入，由外部数据加载方提供
// 约束: budget >= 0, actual_spend >= 0, phase 属于固定有序集合
// ==========================================

use crate::domain::types::{DeliveryOutcome, Phase};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Project - 项目记录
// ==========================================
// 可能缺失的属性显式使用 Option，缺失时由评分引擎标记为不可评分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    // ===== 主键 =====
    pub project_id: String,             // 项目ID (唯一)
    #[serde(default)]
    pub name: Option<String>,           // 项目名称

    // ===== 财务 =====
    #[serde(default)]
    pub budget: Option<f64>,            // 预算 (BAC)
    #[serde(default)]
    pub actual_spend: Option<f64>,      // 累计实际支出 (AC)
    #[serde(default)]
    pub earned_value: Option<f64>,      // 挣值 (EV)
    #[serde(default)]
    pub planned_value: Option<f64>,     // 计划值 (PV)

    // ===== 进度 =====
    #[serde(default)]
    pub planned_start: Option<NaiveDate>, // 计划开始
    #[serde(default)]
    pub planned_end: Option<NaiveDate>,   // 计划完成
    #[serde(default)]
    pub forecast_end: Option<NaiveDate>,  // 预测/实际完成
    #[serde(default)]
    pub phase: Option<Phase>,             // 当前阶段

    // ===== 资源 =====
    #[serde(default)]
    pub allocations: BTreeMap<String, f64>, // 职能 -> FTE

    // ===== 风险与战略 =====
    #[serde(default)]
    pub risk_count: Option<i32>,          // 未关闭风险数
    #[serde(default)]
    pub strategic_value: Option<f64>,     // 战略价值评分
    #[serde(default)]
    pub strategic_goal_id: Option<String>, // 对齐的战略目标
    #[serde(default)]
    pub on_time_rate: Option<f64>,        // 历史按期交付率 (0~1)

    // ===== 历史标签 =====
    #[serde(default)]
    pub final_outcome: Option<DeliveryOutcome>, // 已完成项目的交付结果
}

impl Project {
    /// 创建只有主键的空项目
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            ..Default::default()
        }
    }

    /// 总投入 FTE
    pub fn total_fte(&self) -> f64 {
        self.allocations.values().sum()
    }

    /// 指定职能的 FTE（未分配返回 0）
    pub fn fte_for(&self, function: &str) -> f64 {
        self.allocations.get(function).copied().unwrap_or(0.0)
    }

    /// 是否对齐战略目标
    pub fn is_on_strategy(&self) -> bool {
        self.strategic_goal_id
            .as_deref()
            .map(|g| !g.trim().is_empty())
            .unwrap_or(false)
    }

    /// 计划工期（天）
    pub fn planned_duration_days(&self) -> Option<i64> {
        match (self.planned_start, self.planned_end) {
            (Some(start), Some(end)) => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// 显示名称（缺失时回退到项目ID）
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.project_id)
    }
}
