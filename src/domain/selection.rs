// ==========================================
// 项目组合决策引擎 - 约束集与选择结果
// ==========================================
// 约束: forced_include 与 forced_exclude 不相交
// 约束: 非 Optimal 状态下 selection 为空，且不报告目标值
// ==========================================

use crate::domain::types::{ObjectiveKind, SelectionStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// ConstraintSet - 约束集
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// 总预算上限
    pub budget_cap: f64,

    /// 职能 FTE 上限（未列出的职能不设约束）
    #[serde(default)]
    pub function_caps: BTreeMap<String, f64>,

    /// 强制纳入项目
    #[serde(default)]
    pub forced_include: BTreeSet<String>,

    /// 强制排除项目
    #[serde(default)]
    pub forced_exclude: BTreeSet<String>,
}

impl ConstraintSet {
    pub fn with_budget_cap(budget_cap: f64) -> Self {
        Self {
            budget_cap,
            ..Default::default()
        }
    }

    pub fn function_cap(mut self, function: &str, cap: f64) -> Self {
        self.function_caps.insert(function.to_string(), cap);
        self
    }

    pub fn include(mut self, project_id: &str) -> Self {
        self.forced_include.insert(project_id.to_string());
        self
    }

    pub fn exclude(mut self, project_id: &str) -> Self {
        self.forced_exclude.insert(project_id.to_string());
        self
    }

    /// 强制纳入与强制排除的交集（应为空）
    pub fn forced_overlap(&self) -> Vec<String> {
        self.forced_include
            .intersection(&self.forced_exclude)
            .cloned()
            .collect()
    }

    /// 是否存在负数上限
    pub fn negative_caps(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.budget_cap < 0.0 {
            names.push("budget_cap".to_string());
        }
        for (function, cap) in &self.function_caps {
            if *cap < 0.0 {
                names.push(format!("function_cap[{}]", function));
            }
        }
        names
    }
}

// ==========================================
// SelectionResult - 选择结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub selection_id: String,
    pub objective: ObjectiveKind,
    pub status: SelectionStatus,

    // ===== 决策 =====
    pub selection: BTreeMap<String, bool>, // 项目ID -> 是否资助
    pub objective_value: Option<f64>,

    // ===== 占用 =====
    pub total_budget: f64,
    pub function_fte: BTreeMap<String, f64>,
    pub funded_count: usize,

    // ===== 可解释性 =====
    pub diagnostics: Vec<String>,
    pub nodes_explored: u64,
}

impl SelectionResult {
    /// 构造无解结果（不可行/超时），不携带任何选择
    pub fn without_solution(
        selection_id: String,
        objective: ObjectiveKind,
        status: SelectionStatus,
        diagnostics: Vec<String>,
        nodes_explored: u64,
    ) -> Self {
        debug_assert!(status != SelectionStatus::Optimal);
        Self {
            selection_id,
            objective,
            status,
            selection: BTreeMap::new(),
            objective_value: None,
            total_budget: 0.0,
            function_fte: BTreeMap::new(),
            funded_count: 0,
            diagnostics,
            nodes_explored,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SelectionStatus::Optimal
    }

    /// 被资助的项目ID（按ID排序）
    pub fn funded_ids(&self) -> Vec<&str> {
        self.selection
            .iter()
            .filter(|(_, funded)| **funded)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn is_funded(&self, project_id: &str) -> bool {
        self.selection.get(project_id).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_builder_and_checks() {
        let c = ConstraintSet::with_budget_cap(-1.0)
            .function_cap("RA/QA", 2.0)
            .include("A")
            .exclude("A");
        assert_eq!(c.forced_overlap(), vec!["A".to_string()]);
        assert_eq!(c.negative_caps(), vec!["budget_cap".to_string()]);
    }

    #[test]
    fn test_without_solution_is_empty() {
        let r = SelectionResult::without_solution(
            "S1".to_string(),
            ObjectiveKind::MaximizeStrategicValue,
            SelectionStatus::Infeasible,
            vec!["FORCED_INCLUDE_OVER_BUDGET".to_string()],
            0,
        );
        assert!(r.selection.is_empty());
        assert!(r.objective_value.is_none());
        assert!(r.funded_ids().is_empty());
    }
}
