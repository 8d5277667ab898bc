// ==========================================
// 组合洞察集成测试 - 原型聚类与告警
// ==========================================

mod helpers;

use helpers::test_data_builder::{as_of, ProjectBuilder};
use pmo_portfolio_engine::config::{config_keys, ConfigManager, EngineConfig};
use pmo_portfolio_engine::domain::alert::AlertType;
use pmo_portfolio_engine::domain::project::Project;
use pmo_portfolio_engine::{AlertSeverity, PortfolioApi};

fn api_with_k(k: usize) -> PortfolioApi {
    let manager = ConfigManager::from_kv([(config_keys::ARCHETYPE_COUNT, k.to_string())]);
    PortfolioApi::from_config_manager(&manager).unwrap()
}

fn two_groups() -> Vec<Project> {
    let mut projects = Vec::new();
    for i in 0..3 {
        projects.push(
            ProjectBuilder::new(&format!("SUSTAIN-{}", i))
                .budget(800_000.0 + 50_000.0 * i as f64)
                .actual_spend(300_000.0)
                .risk_count(1)
                .strategic_value(2.0)
                .build(),
        );
        projects.push(
            ProjectBuilder::new(&format!("PLATFORM-{}", i))
                .budget(12_000_000.0 + 500_000.0 * i as f64)
                .actual_spend(5_000_000.0)
                .risk_count(11 + i)
                .strategic_value(9.0)
                .allocation("Clinical", 6.0)
                .build(),
        );
    }
    projects
}

// ==========================================
// 原型聚类
// ==========================================

#[test]
fn test_clusters_separate_obvious_groups() {
    let api = api_with_k(2);
    let scored = api.score_and_pair(&two_groups(), as_of());
    let result = api.cluster_projects(&scored).unwrap();

    assert_eq!(result.archetypes.len(), 2);
    assert_eq!(result.assignments.len(), 6);

    let small = result.assignments["SUSTAIN-0"];
    let large = result.assignments["PLATFORM-0"];
    assert_ne!(small, large);
    for i in 0..3 {
        assert_eq!(result.assignments[&format!("SUSTAIN-{}", i)], small);
        assert_eq!(result.assignments[&format!("PLATFORM-{}", i)], large);
    }

    let archetype = result.archetype_of("PLATFORM-1").unwrap();
    assert_eq!(archetype.members.len(), 3);
    assert!(archetype.centroid["budget"] > 10_000_000.0);
    assert_eq!(archetype.label, format!("Archetype {}", large + 1));
}

#[test]
fn test_clustering_is_deterministic_and_skips_unscored() {
    let api = api_with_k(2);
    let mut projects = two_groups();
    let mut broken = ProjectBuilder::new("BROKEN").build();
    broken.planned_start = None;
    projects.push(broken);

    let scored = api.score_and_pair(&projects, as_of());
    let first = api.cluster_projects(&scored).unwrap();
    let second = api.cluster_projects(&scored).unwrap();

    assert_eq!(first, second);
    assert!(!first.assignments.contains_key("BROKEN"));
}

#[test]
fn test_too_few_projects_for_k() {
    let api = api_with_k(4);
    let scored = api.score_and_pair(&two_groups()[..3], as_of());
    assert!(api.cluster_projects(&scored).is_none());
}

// ==========================================
// 告警
// ==========================================

#[test]
fn test_alerts_for_overrun_anomaly_and_unscored() {
    let api = PortfolioApi::new(EngineConfig::default()).unwrap();
    let mut projects: Vec<Project> = [1_000_000.0, 1_050_000.0, 950_000.0, 1_020_000.0]
        .iter()
        .enumerate()
        .map(|(i, s)| ProjectBuilder::new(&format!("DEV-{}", i)).actual_spend(*s).build())
        .collect();
    projects.push(
        ProjectBuilder::new("HOT")
            .actual_spend(3_000_000.0)
            .build(),
    );
    let mut unscored = ProjectBuilder::new("NO-PHASE").build();
    unscored.phase = None;
    projects.push(unscored);

    let scored = api.score_and_pair(&projects, as_of());
    let alerts = api.alerts(&scored);

    let hot: Vec<_> = alerts.iter().filter(|a| a.project_id == "HOT").collect();
    assert!(hot
        .iter()
        .any(|a| a.alert_type == AlertType::CostOverrunPredicted
            && a.severity == AlertSeverity::Warning));
    assert!(hot.iter().any(|a| a.alert_type == AlertType::BurnRateAnomaly));

    let missing: Vec<_> = alerts
        .iter()
        .filter(|a| a.project_id == "NO-PHASE")
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].alert_type, AlertType::ScoreUnavailable);
    assert_eq!(missing[0].severity, AlertSeverity::Info);
    assert!(missing[0].message.contains("phase"));

    assert!(alerts
        .iter()
        .all(|a| a.project_id != "DEV-0" || a.alert_type != AlertType::BurnRateAnomaly));
}
