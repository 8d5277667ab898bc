// ==========================================
// 项目组合决策引擎 - 组合优化引擎
// ==========================================
// 职责: 约束校验 → 模型构建 → 分支定界 → 结果组装
// 调用方错误（约束集自相矛盾、引用未知项目等）返回 Err
// 不可行、超时通过 SelectionResult.status 返回
// ==========================================

use super::branch_bound;
use super::formulation::{self, Formulated};
use crate::config::EngineConfig;
use crate::domain::score::ScoredProject;
use crate::domain::selection::{ConstraintSet, SelectionResult};
use crate::domain::types::{ObjectiveKind, SelectionStatus};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PortfolioOptimizer - 组合优化引擎
// ==========================================
pub struct PortfolioOptimizer {
    time_budget: Duration,
}

impl PortfolioOptimizer {
    /// # 参数
    /// - `time_budget`: 求解时间预算，超出后返回 TimedOut
    pub fn new(time_budget: Duration) -> Self {
        Self { time_budget }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.solver_time_budget())
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    /// 求解资助组合
    ///
    /// # 参数
    /// - `projects`: 已评分项目（未能评分的项目不参与资助）
    /// - `objective`: 优化目标
    /// - `constraints`: 约束集
    ///
    /// # 返回
    /// - Ok(SelectionResult): Optimal / Infeasible / TimedOut
    /// - Err(EngineError): 项目ID重复、上限非有限值、强制集合重叠或引用未知项目
    #[instrument(skip(self, projects, constraints), fields(projects = projects.len(), objective = %objective))]
    pub fn optimize(
        &self,
        projects: &[ScoredProject],
        objective: ObjectiveKind,
        constraints: &ConstraintSet,
    ) -> EngineResult<SelectionResult> {
        let started = Instant::now();
        let deadline = started + self.time_budget;
        let selection_id = Uuid::new_v4().to_string();

        validate(projects, constraints)?;

        let formulation = match formulation::formulate(projects, objective, constraints) {
            Formulated::Ready(f) => f,
            Formulated::Infeasible(diagnostics) => {
                warn!(diagnostics = ?diagnostics, "约束不可满足");
                return Ok(SelectionResult::without_solution(
                    selection_id,
                    objective,
                    SelectionStatus::Infeasible,
                    diagnostics,
                    0,
                ));
            }
        };

        let candidates = formulation.candidates.len();
        let outcome = branch_bound::search(
            formulation.candidates,
            formulation.budget_left,
            &formulation.caps_left,
            deadline,
        );

        if outcome.timed_out {
            warn!(
                nodes = outcome.nodes,
                time_budget_ms = self.time_budget.as_millis() as u64,
                "求解超时"
            );
            let mut diagnostics = formulation.diagnostics;
            diagnostics.push(format!(
                "SOLVER_TIME_BUDGET_EXCEEDED: nodes={}, budget_ms={}",
                outcome.nodes,
                self.time_budget.as_millis()
            ));
            return Ok(SelectionResult::without_solution(
                selection_id,
                objective,
                SelectionStatus::TimedOut,
                diagnostics,
                outcome.nodes,
            ));
        }

        // 结果组装
        let funded: HashSet<usize> = formulation
            .forced
            .iter()
            .chain(outcome.chosen.iter())
            .copied()
            .collect();

        let mut selection = BTreeMap::new();
        let mut objective_value = 0.0;
        let mut total_budget = 0.0;
        let mut function_fte: BTreeMap<String, f64> = BTreeMap::new();
        for (slot, sp) in projects.iter().enumerate() {
            let is_funded = funded.contains(&slot);
            selection.insert(sp.project_id().to_string(), is_funded);
            if !is_funded {
                continue;
            }
            objective_value += formulation::objective_term(objective, sp);
            total_budget += sp.project.budget.unwrap_or(0.0);
            for (function, fte) in &sp.project.allocations {
                *function_fte.entry(function.clone()).or_insert(0.0) += fte;
            }
        }

        info!(
            funded = funded.len(),
            candidates = candidates,
            capped_functions = formulation.capped_functions.len(),
            objective_value = objective_value,
            total_budget = total_budget,
            nodes = outcome.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "组合优化完成"
        );

        Ok(SelectionResult {
            selection_id,
            objective,
            status: SelectionStatus::Optimal,
            selection,
            objective_value: Some(objective_value),
            total_budget,
            function_fte,
            funded_count: funded.len(),
            diagnostics: formulation.diagnostics,
            nodes_explored: outcome.nodes,
        })
    }
}

/// 调用方错误检查
fn validate(projects: &[ScoredProject], constraints: &ConstraintSet) -> EngineResult<()> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(projects.len());
    for sp in projects {
        if !ids.insert(sp.project_id()) {
            return Err(EngineError::DuplicateProjectId(sp.project_id().to_string()));
        }
    }

    if !constraints.budget_cap.is_finite() {
        return Err(EngineError::NonFiniteCap {
            name: "budget_cap".to_string(),
            value: constraints.budget_cap,
        });
    }
    for (function, cap) in &constraints.function_caps {
        if !cap.is_finite() {
            return Err(EngineError::NonFiniteCap {
                name: format!("function_cap[{}]", function),
                value: *cap,
            });
        }
    }

    let overlap = constraints.forced_overlap();
    if !overlap.is_empty() {
        return Err(EngineError::ForcedSetOverlap(overlap));
    }

    let unknown: Vec<String> = constraints
        .forced_include
        .iter()
        .chain(constraints.forced_exclude.iter())
        .filter(|id| !ids.contains(id.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(EngineError::UnknownForcedProject(unknown));
    }

    Ok(())
}
