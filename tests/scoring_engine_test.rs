// ==========================================
// ScoringEngine 集成测试
// ==========================================
// 测试目标: 批量评分的输出约定、属性贡献、完工成本、异常检测、模型训练
// ==========================================

mod helpers;

use helpers::test_data_builder::{as_of, d, ProjectBuilder};
use pmo_portfolio_engine::config::EngineConfig;
use pmo_portfolio_engine::domain::score::UnavailableReason;
use pmo_portfolio_engine::domain::types::{DeliveryOutcome, Phase};
use pmo_portfolio_engine::engine::ScoringEngine;

fn engine() -> ScoringEngine {
    ScoringEngine::with_prior_model(&EngineConfig::default())
}

// ==========================================
// 输出约定
// ==========================================

#[test]
fn test_output_matches_input_length_and_order() {
    let projects = vec![
        ProjectBuilder::new("NPD-003").build(),
        ProjectBuilder::new("NPD-001").risk_count(9).build(),
        ProjectBuilder::new("NPD-002").phase(Phase::Concept).build(),
    ];
    let records = engine().score(&projects, as_of());

    assert_eq!(records.len(), projects.len());
    for (p, r) in projects.iter().zip(&records) {
        assert_eq!(p.project_id, r.project_id);
        assert!(r.is_scored());
    }
}

#[test]
fn test_probability_range_and_contribution_sum() {
    let projects = vec![
        ProjectBuilder::new("A").build(),
        ProjectBuilder::new("B")
            .risk_count(15)
            .on_time_rate(0.3)
            .forecast_end(d(2026, 9, 1))
            .build(),
        ProjectBuilder::new("C")
            .risk_count(0)
            .on_time_rate(1.0)
            .actual_spend(100_000.0)
            .build(),
        ProjectBuilder::new("D").budget(0.0).actual_spend(0.0).build(),
    ];
    for r in engine().score(&projects, as_of()) {
        let s = r.score().unwrap();
        assert!((0.0..=1.0).contains(&s.delay_probability));
        assert!((0.0..=1.0).contains(&s.baseline_delay_probability));
        let delta = s.delay_probability - s.baseline_delay_probability;
        assert!((s.contribution_sum() - delta).abs() <= 1e-6);
        assert_eq!(s.contributions.len(), 7);
    }
}

#[test]
fn test_riskier_project_scores_higher() {
    let projects = vec![
        ProjectBuilder::new("SAFE")
            .risk_count(1)
            .on_time_rate(0.95)
            .build(),
        ProjectBuilder::new("RISKY")
            .risk_count(12)
            .on_time_rate(0.4)
            .forecast_end(d(2026, 6, 1))
            .build(),
    ];
    let records = engine().score(&projects, as_of());
    let safe = records[0].score().unwrap();
    let risky = records[1].score().unwrap();
    assert!(risky.delay_probability > safe.delay_probability);

    let top = risky.top_drivers(1);
    assert!(top[0].contribution > 0.0);
}

// ==========================================
// 完工成本
// ==========================================

#[test]
fn test_cost_at_completion_floor_and_monotone() {
    let spends = [0.0, 200_000.0, 800_000.0, 1_500_000.0, 2_500_000.0, 4_000_000.0];
    let projects: Vec<_> = spends
        .iter()
        .enumerate()
        .map(|(i, s)| {
            ProjectBuilder::new(&format!("P{}", i))
                .actual_spend(*s)
                .earned_value(800_000.0)
                .build()
        })
        .collect();
    let records = engine().score(&projects, as_of());

    let mut prev = f64::NEG_INFINITY;
    for (spend, r) in spends.iter().zip(&records) {
        let eac = r.score().unwrap().cost_at_completion;
        assert!(eac >= *spend);
        assert!(eac >= prev);
        prev = eac;
    }
}

// ==========================================
// 不可评分隔离
// ==========================================

#[test]
fn test_unavailable_project_does_not_affect_others() {
    let good_a = ProjectBuilder::new("A").build();
    let good_b = ProjectBuilder::new("B").risk_count(7).build();
    let mut broken = ProjectBuilder::new("X").build();
    broken.strategic_value = None;
    let mut nan = ProjectBuilder::new("Y").build();
    nan.budget = Some(f64::INFINITY);

    let alone = engine().score(&[good_a.clone(), good_b.clone()], as_of());
    let mixed = engine().score(&[good_a, broken, good_b, nan], as_of());

    assert_eq!(mixed.len(), 4);
    assert_eq!(mixed[0].outcome, alone[0].outcome);
    assert_eq!(mixed[2].outcome, alone[1].outcome);
    assert_eq!(
        mixed[1].unavailable_reason(),
        Some(&UnavailableReason::MissingAttribute {
            field: "strategic_value".to_string()
        })
    );
    assert!(matches!(
        mixed[3].unavailable_reason(),
        Some(UnavailableReason::NonFiniteValue { .. })
    ));
}

#[test]
fn test_invalid_schedule_and_rates() {
    let projects = vec![
        ProjectBuilder::new("END_BEFORE_START")
            .schedule(d(2025, 6, 1), d(2025, 1, 1))
            .build(),
        ProjectBuilder::new("RATE").on_time_rate(-0.1).build(),
        ProjectBuilder::new("RISKS").risk_count(-2).build(),
    ];
    let records = engine().score(&projects, as_of());
    assert!(matches!(
        records[0].unavailable_reason(),
        Some(UnavailableReason::InvalidSchedule { .. })
    ));
    assert!(matches!(
        records[1].unavailable_reason(),
        Some(UnavailableReason::OutOfRange { .. })
    ));
    assert!(matches!(
        records[2].unavailable_reason(),
        Some(UnavailableReason::NegativeValue { .. })
    ));
}

// ==========================================
// 燃烧率异常
// ==========================================

#[test]
fn test_burn_anomaly_flagged_within_phase() {
    let spends = [1_000_000.0, 1_050_000.0, 950_000.0, 1_020_000.0, 1_900_000.0];
    let mut projects: Vec<_> = spends
        .iter()
        .enumerate()
        .map(|(i, s)| ProjectBuilder::new(&format!("DEV-{}", i)).actual_spend(*s).build())
        .collect();
    // 其他阶段的项目不参与开发阶段的比较
    projects.push(
        ProjectBuilder::new("CON-1")
            .phase(Phase::Concept)
            .actual_spend(1_990_000.0)
            .build(),
    );

    let records = engine().score(&projects, as_of());
    assert!(records[4].is_anomalous());
    assert!(!records[0].is_anomalous());
    assert_eq!(records[4].burn_anomaly.as_ref().unwrap().cohort_size, 4);
    // 概念阶段只有 1 个项目，不给出结论
    assert!(records[5].burn_anomaly.is_none());
}

// ==========================================
// 模型训练
// ==========================================

#[test]
fn test_train_from_history() {
    let mut history = Vec::new();
    for i in 0..4 {
        history.push(
            ProjectBuilder::new(&format!("LATE-{}", i))
                .risk_count(8 + i)
                .on_time_rate(0.5)
                .forecast_end(d(2026, 5, 1))
                .outcome(DeliveryOutcome::Delayed)
                .build(),
        );
        history.push(
            ProjectBuilder::new(&format!("OK-{}", i))
                .risk_count(1 + i % 2)
                .on_time_rate(0.9)
                .outcome(DeliveryOutcome::OnTime)
                .build(),
        );
    }
    // 无标签项目不参与训练
    history.push(ProjectBuilder::new("OPEN").build());

    let engine = ScoringEngine::train(&history, as_of(), &EngineConfig::default());
    assert_eq!(engine.model_name(), "logistic_fitted");

    let records = engine.score(
        &[
            ProjectBuilder::new("NEW-RISKY")
                .risk_count(10)
                .on_time_rate(0.5)
                .forecast_end(d(2026, 5, 1))
                .build(),
            ProjectBuilder::new("NEW-SAFE")
                .risk_count(1)
                .on_time_rate(0.9)
                .build(),
        ],
        as_of(),
    );
    let risky = records[0].score().unwrap();
    let safe = records[1].score().unwrap();
    assert!(risky.delay_probability > safe.delay_probability);
    assert_eq!(risky.model_name, "logistic_fitted");
}

#[test]
fn test_train_cost_ratio_from_history() {
    // 风险越多，最终超支越多；全部按期交付，延期模型回退先验
    let history: Vec<_> = (0..6)
        .map(|i| {
            ProjectBuilder::new(&format!("DONE-{}", i))
                .risk_count(1 + 2 * i)
                .actual_spend(2_000_000.0 * (1.0 + 0.08 * i as f64))
                .outcome(DeliveryOutcome::OnTime)
                .build()
        })
        .collect();

    let engine = ScoringEngine::train(&history, as_of(), &EngineConfig::default());
    assert_eq!(engine.model_name(), "logistic_prior");
    assert_eq!(engine.cost_estimator(), "cost_ratio_fitted");

    let records = engine.score(
        &[
            ProjectBuilder::new("NEW-RISKY")
                .risk_count(11)
                .actual_spend(500_000.0)
                .build(),
            ProjectBuilder::new("NEW-SAFE")
                .risk_count(1)
                .actual_spend(500_000.0)
                .build(),
            ProjectBuilder::new("NEW-BURNT")
                .risk_count(1)
                .actual_spend(3_500_000.0)
                .build(),
        ],
        as_of(),
    );
    let risky = records[0].score().unwrap().cost_at_completion;
    let safe = records[1].score().unwrap().cost_at_completion;
    let burnt = records[2].score().unwrap().cost_at_completion;
    assert!(risky > safe);
    assert!(risky > 2_500_000.0);
    assert!(safe >= 500_000.0);
    // 已支出超过预测值时取实际支出
    assert_eq!(burnt, 3_500_000.0);

    // 样本不足时仍用挣值公式
    let engine = ScoringEngine::train(&history[..2], as_of(), &EngineConfig::default());
    assert_eq!(engine.cost_estimator(), "evm_formula");
}
