use super::*;
use crate::domain::project::Project;
use crate::domain::score::{EvmMetrics, ProjectScore, ScoreOutcome, ScoreRecord, ScoredProject};
use crate::domain::selection::ConstraintSet;
use crate::domain::types::{ObjectiveKind, SelectionStatus};
use crate::engine::error::EngineError;
use std::time::Duration;

// ==========================================
// 测试辅助函数
// ==========================================

fn scored(id: &str, budget: f64, value: f64, delay: f64) -> ScoredProject {
    let mut project = Project::new(id);
    project.budget = Some(budget);
    project.strategic_value = Some(value);
    ScoredProject {
        project,
        record: ScoreRecord {
            project_id: id.to_string(),
            outcome: ScoreOutcome::Scored(ProjectScore {
                delay_probability: delay,
                baseline_delay_probability: 0.35,
                cost_at_completion: budget,
                contributions: vec![],
                evm: EvmMetrics { cpi: 1.0, spi: 1.0 },
                model_name: "test".to_string(),
            }),
            burn_anomaly: None,
        },
    }
}

fn optimizer() -> PortfolioOptimizer {
    PortfolioOptimizer::new(Duration::from_secs(10))
}

#[test]
fn test_tie_prefers_fewer_projects() {
    let projects = vec![
        scored("P1", 100.0, 5.0, 0.3),
        scored("P2", 150.0, 9.0, 0.3),
        scored("P3", 80.0, 4.0, 0.3),
    ];
    let result = optimizer()
        .optimize(
            &projects,
            ObjectiveKind::MaximizeStrategicValue,
            &ConstraintSet::with_budget_cap(200.0),
        )
        .unwrap();
    assert_eq!(result.status, SelectionStatus::Optimal);
    assert_eq!(result.funded_ids(), vec!["P2"]);
    assert_eq!(result.objective_value, Some(9.0));
    assert_eq!(result.total_budget, 150.0);
}

#[test]
fn test_tie_prefers_lower_budget() {
    let projects = vec![scored("A", 120.0, 6.0, 0.3), scored("B", 90.0, 6.0, 0.3)];
    let result = optimizer()
        .optimize(
            &projects,
            ObjectiveKind::MaximizeStrategicValue,
            &ConstraintSet::with_budget_cap(150.0),
        )
        .unwrap();
    assert_eq!(result.funded_ids(), vec!["B"]);
}

#[test]
fn test_forced_include_over_budget_is_infeasible() {
    let projects = vec![scored("A", 120.0, 6.0, 0.3), scored("B", 90.0, 6.0, 0.3)];
    let constraints = ConstraintSet::with_budget_cap(150.0).include("A").include("B");
    let result = optimizer()
        .optimize(&projects, ObjectiveKind::MaximizeStrategicValue, &constraints)
        .unwrap();
    assert_eq!(result.status, SelectionStatus::Infeasible);
    assert!(result.selection.is_empty());
    assert!(result.objective_value.is_none());
    assert!(result.diagnostics[0].starts_with("FORCED_INCLUDE_OVER_BUDGET"));
}

#[test]
fn test_negative_cap_is_infeasible() {
    let projects = vec![scored("A", 10.0, 1.0, 0.3)];
    let result = optimizer()
        .optimize(
            &projects,
            ObjectiveKind::MaximizeStrategicValue,
            &ConstraintSet::with_budget_cap(-1.0),
        )
        .unwrap();
    assert_eq!(result.status, SelectionStatus::Infeasible);
}

#[test]
fn test_caller_errors() {
    let projects = vec![scored("A", 10.0, 1.0, 0.3)];
    let opt = optimizer();

    let overlap = ConstraintSet::with_budget_cap(100.0).include("A").exclude("A");
    assert_eq!(
        opt.optimize(&projects, ObjectiveKind::MaximizeStrategicValue, &overlap),
        Err(EngineError::ForcedSetOverlap(vec!["A".to_string()]))
    );

    let unknown = ConstraintSet::with_budget_cap(100.0).include("Z");
    assert!(matches!(
        opt.optimize(&projects, ObjectiveKind::MaximizeStrategicValue, &unknown),
        Err(EngineError::UnknownForcedProject(_))
    ));

    let nan = ConstraintSet::with_budget_cap(f64::NAN);
    assert!(matches!(
        opt.optimize(&projects, ObjectiveKind::MaximizeStrategicValue, &nan),
        Err(EngineError::NonFiniteCap { .. })
    ));

    let dup = vec![scored("A", 10.0, 1.0, 0.3), scored("A", 20.0, 2.0, 0.3)];
    assert!(matches!(
        opt.optimize(
            &dup,
            ObjectiveKind::MaximizeStrategicValue,
            &ConstraintSet::with_budget_cap(100.0)
        ),
        Err(EngineError::DuplicateProjectId(_))
    ));
}

#[test]
fn test_zero_time_budget_times_out() {
    let projects: Vec<ScoredProject> = (0..20)
        .map(|i| scored(&format!("P{:02}", i), 10.0 + i as f64, 1.0 + i as f64, 0.3))
        .collect();
    let result = PortfolioOptimizer::new(Duration::ZERO)
        .optimize(
            &projects,
            ObjectiveKind::MaximizeStrategicValue,
            &ConstraintSet::with_budget_cap(100.0),
        )
        .unwrap();
    assert_eq!(result.status, SelectionStatus::TimedOut);
    assert!(result.selection.is_empty());
    assert!(result.objective_value.is_none());
}

#[test]
fn test_minimize_risk_funds_only_forced() {
    let projects = vec![
        scored("A", 10.0, 1.0, 0.8),
        scored("B", 10.0, 1.0, 0.1),
        scored("C", 10.0, 1.0, 0.4),
    ];
    let constraints = ConstraintSet::with_budget_cap(100.0).include("C");
    let result = optimizer()
        .optimize(&projects, ObjectiveKind::MinimizeRisk, &constraints)
        .unwrap();
    assert_eq!(result.funded_ids(), vec!["C"]);
    assert!((result.objective_value.unwrap() - 0.4).abs() < 1e-12);
}

#[test]
fn test_function_cap_respected() {
    let mut a = scored("A", 10.0, 5.0, 0.3);
    a.project.allocations.insert("RA/QA".to_string(), 2.0);
    let mut b = scored("B", 10.0, 4.0, 0.3);
    b.project.allocations.insert("RA/QA".to_string(), 2.0);
    let mut c = scored("C", 10.0, 3.0, 0.3);
    c.project.allocations.insert("Operations".to_string(), 1.0);

    let constraints = ConstraintSet::with_budget_cap(100.0).function_cap("RA/QA", 3.0);
    let result = optimizer()
        .optimize(&[a, b, c], ObjectiveKind::MaximizeStrategicValue, &constraints)
        .unwrap();
    assert_eq!(result.funded_ids(), vec!["A", "C"]);
    assert_eq!(result.function_fte.get("RA/QA"), Some(&2.0));
    assert_eq!(result.function_fte.get("Operations"), Some(&1.0));
}

// ==========================================
// 生成实例：与穷举结果对比
// ==========================================

/// 线性同余生成器（测试数据可复现）
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

/// 穷举最优（收益最大 → 项目数最少 → 预算最低），返回 (收益, 项目数, 预算)
fn brute_force(items: &[(f64, f64, f64)], budget_cap: f64, fte_cap: f64) -> (f64, usize, f64) {
    let mut best = (0.0, 0usize, 0.0);
    for mask in 0u32..(1 << items.len()) {
        let (mut gain, mut count, mut budget, mut fte) = (0.0, 0usize, 0.0, 0.0);
        for (i, (g, b, f)) in items.iter().enumerate() {
            if mask & (1 << i) != 0 {
                gain += g;
                count += 1;
                budget += b;
                fte += f;
            }
        }
        if budget > budget_cap || fte > fte_cap {
            continue;
        }
        let better = gain > best.0
            || (gain == best.0 && (count < best.1 || (count == best.1 && budget < best.2)));
        if better {
            best = (gain, count, budget);
        }
    }
    best
}

fn generated_instance(rng: &mut Lcg, n: usize, values: &[f64]) -> Vec<ScoredProject> {
    (0..n)
        .map(|i| {
            let budget = 10.0 * (1 + rng.next(5)) as f64;
            let value = values[rng.next(values.len() as u64) as usize];
            let mut sp = scored(&format!("G{:02}", i), budget, value, 0.3);
            let fte = rng.next(3) as f64;
            if fte > 0.0 {
                sp.project.allocations.insert("RA/QA".to_string(), fte);
            }
            if rng.next(3) > 0 {
                sp.project.strategic_goal_id = Some("G-GROWTH".to_string());
            }
            sp
        })
        .collect()
}

#[test]
fn test_matches_brute_force_on_generated_instances() {
    let mut rng = Lcg(20260319);
    // 整数收益（大量并列）与二进制精确小数收益各一组
    let value_sets: [&[f64]; 2] = [&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.5, 2.25, 3.0]];

    for round in 0..24 {
        let n = 8 + round % 7;
        let values = value_sets[round % 2];
        let projects = generated_instance(&mut rng, n, values);
        let total: f64 = projects.iter().filter_map(|sp| sp.project.budget).sum();
        let budget_cap = (total * 0.4).round();
        let fte_cap = 2.0 + rng.next(6) as f64;
        let constraints =
            ConstraintSet::with_budget_cap(budget_cap).function_cap("RA/QA", fte_cap);

        for objective in [
            ObjectiveKind::MaximizeStrategicValue,
            ObjectiveKind::MaximizeOnStrategyCount,
        ] {
            let items: Vec<(f64, f64, f64)> = projects
                .iter()
                .map(|sp| {
                    let gain = match objective {
                        ObjectiveKind::MaximizeOnStrategyCount => {
                            if sp.project.is_on_strategy() {
                                1.0
                            } else {
                                0.0
                            }
                        }
                        _ => sp.project.strategic_value.unwrap(),
                    };
                    (gain, sp.project.budget.unwrap(), sp.project.fte_for("RA/QA"))
                })
                .collect();
            let (gain, count, budget) = brute_force(&items, budget_cap, fte_cap);

            let result = optimizer()
                .optimize(&projects, objective, &constraints)
                .unwrap();
            assert_eq!(result.status, SelectionStatus::Optimal, "round {}", round);
            assert_eq!(result.objective_value, Some(gain), "round {} {}", round, objective);
            assert_eq!(result.funded_count, count, "round {} {}", round, objective);
            assert_eq!(result.total_budget, budget, "round {} {}", round, objective);
        }
    }
}

#[test]
fn test_identical_projects_solved_without_enumeration() {
    let projects: Vec<ScoredProject> = (0..60)
        .map(|i| scored(&format!("T{:02}", i), 100.0, 1.0, 0.3))
        .collect();
    let result = optimizer()
        .optimize(
            &projects,
            ObjectiveKind::MaximizeStrategicValue,
            &ConstraintSet::with_budget_cap(2000.0),
        )
        .unwrap();

    assert_eq!(result.status, SelectionStatus::Optimal);
    assert_eq!(result.objective_value, Some(20.0));
    assert_eq!(result.funded_count, 20);
    // 相同项目按输入顺序取前 20 个
    let expected: Vec<String> = (0..20).map(|i| format!("T{:02}", i)).collect();
    assert_eq!(result.funded_ids(), expected);
    assert!(result.nodes_explored < 100);
}
