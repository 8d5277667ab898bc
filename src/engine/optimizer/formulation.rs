// ==========================================
// 项目组合决策引擎 - 优化模型构建
// ==========================================
// 将项目表与约束集转换为分支定界的候选项:
// - 强制纳入项目先行扣减预算/产能
// - 强制排除、未评分、收益 <= 0、单独放入即超限的项目固定为 0
// ==========================================

use crate::domain::score::ScoredProject;
use crate::domain::selection::ConstraintSet;
use crate::domain::types::ObjectiveKind;

/// 容量比较容差（相对）
pub(super) fn fits_within(amount: f64, left: f64) -> bool {
    amount <= left + 1e-9 * left.abs().max(1.0)
}

/// 项目对目标函数的收益（统一为最大化）
pub(super) fn gain_for(objective: ObjectiveKind, sp: &ScoredProject) -> f64 {
    let Some(score) = sp.record.score() else {
        return 0.0;
    };
    match objective {
        ObjectiveKind::MaximizeStrategicValue => sp.project.strategic_value.unwrap_or(0.0),
        ObjectiveKind::MinimizeRisk => -score.delay_probability,
        ObjectiveKind::MaximizeOnStrategyCount => {
            if sp.project.is_on_strategy() {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// 项目对报告目标值的贡献（原始方向）
pub(super) fn objective_term(objective: ObjectiveKind, sp: &ScoredProject) -> f64 {
    match objective {
        ObjectiveKind::MinimizeRisk => sp
            .record
            .score()
            .map(|s| s.delay_probability)
            .unwrap_or(0.0),
        _ => gain_for(objective, sp),
    }
}

// ==========================================
// Candidate - 分支定界候选项
// ==========================================
#[derive(Debug, Clone)]
pub(super) struct Candidate {
    /// 项目在输入中的位置
    pub slot: usize,
    pub gain: f64,
    pub budget: f64,
    /// 与 Formulation::capped_functions 对齐
    pub fte: Vec<f64>,
}

impl Candidate {
    pub fn fits(&self, budget_left: f64, caps_left: &[f64]) -> bool {
        fits_within(self.budget, budget_left)
            && self
                .fte
                .iter()
                .zip(caps_left)
                .all(|(need, left)| fits_within(*need, *left))
    }
}

#[derive(Debug, Clone)]
pub(super) struct Formulation {
    pub capped_functions: Vec<String>,
    pub candidates: Vec<Candidate>,
    pub forced: Vec<usize>,
    pub budget_left: f64,
    pub caps_left: Vec<f64>,
    pub diagnostics: Vec<String>,
}

pub(super) enum Formulated {
    Ready(Formulation),
    Infeasible(Vec<String>),
}

/// 构建优化模型
///
/// 前置条件: 已完成约束合法性校验（重叠、非有限值、未知项目）
pub(super) fn formulate(
    projects: &[ScoredProject],
    objective: ObjectiveKind,
    constraints: &ConstraintSet,
) -> Formulated {
    // 1. 负数上限
    let negative = constraints.negative_caps();
    if !negative.is_empty() {
        return Formulated::Infeasible(
            negative
                .into_iter()
                .map(|name| format!("NEGATIVE_CAP: {}", name))
                .collect(),
        );
    }

    // 2. 强制纳入但无法评分
    let unscored_forced: Vec<String> = projects
        .iter()
        .filter(|sp| constraints.forced_include.contains(sp.project_id()) && !sp.record.is_scored())
        .map(|sp| format!("FORCED_PROJECT_UNSCORED: project_id={}", sp.project_id()))
        .collect();
    if !unscored_forced.is_empty() {
        return Formulated::Infeasible(unscored_forced);
    }

    let capped_functions: Vec<String> = constraints.function_caps.keys().cloned().collect();
    let mut budget_left = constraints.budget_cap;
    let mut caps_left: Vec<f64> = constraints.function_caps.values().copied().collect();
    let mut forced = Vec::new();
    let mut diagnostics = Vec::new();

    // 3. 强制纳入先行扣减
    for (slot, sp) in projects.iter().enumerate() {
        if !constraints.forced_include.contains(sp.project_id()) {
            continue;
        }
        forced.push(slot);
        budget_left -= sp.project.budget.unwrap_or(0.0);
        for (i, function) in capped_functions.iter().enumerate() {
            caps_left[i] -= sp.project.fte_for(function);
        }
    }

    let mut violations = Vec::new();
    if !fits_within(0.0, budget_left) {
        violations.push(format!(
            "FORCED_INCLUDE_OVER_BUDGET: required={:.2}, cap={:.2}",
            constraints.budget_cap - budget_left,
            constraints.budget_cap
        ));
    }
    for (i, function) in capped_functions.iter().enumerate() {
        if !fits_within(0.0, caps_left[i]) {
            let cap = constraints.function_caps.get(function).copied().unwrap_or(0.0);
            violations.push(format!(
                "FORCED_INCLUDE_OVER_CAPACITY: function={}, required={:.2}, cap={:.2}",
                function,
                cap - caps_left[i],
                cap
            ));
        }
    }
    if !violations.is_empty() {
        return Formulated::Infeasible(violations);
    }

    // 4. 自由变量
    let mut candidates = Vec::new();
    for (slot, sp) in projects.iter().enumerate() {
        let id = sp.project_id();
        if constraints.forced_include.contains(id) || constraints.forced_exclude.contains(id) {
            continue;
        }
        if !sp.record.is_scored() {
            diagnostics.push(format!("PROJECT_UNSCORED_EXCLUDED: project_id={}", id));
            continue;
        }
        let candidate = Candidate {
            slot,
            gain: gain_for(objective, sp),
            budget: sp.project.budget.unwrap_or(0.0),
            fte: capped_functions
                .iter()
                .map(|f| sp.project.fte_for(f))
                .collect(),
        };
        if candidate.gain <= 0.0 || !candidate.fits(budget_left, &caps_left) {
            continue;
        }
        candidates.push(candidate);
    }

    Formulated::Ready(Formulation {
        capped_functions,
        candidates,
        forced,
        budget_left,
        caps_left,
        diagnostics,
    })
}
