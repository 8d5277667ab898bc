// ==========================================
// 资源需求预测集成测试
// ==========================================
// 测试目标: 历史不足处理、趋势外推、期间推算、产能缺口
// ==========================================

mod helpers;

use helpers::test_data_builder::{d, monthly_series};
use pmo_portfolio_engine::config::{config_keys, ConfigManager, EngineConfig};
use pmo_portfolio_engine::domain::forecast::{DemandPoint, DemandSeries, ForecastUnavailableReason};
use pmo_portfolio_engine::{ForecastOutcome, PortfolioApi};
use std::collections::BTreeMap;

fn api() -> PortfolioApi {
    PortfolioApi::new(EngineConfig::default()).unwrap()
}

fn rising(function: &str) -> DemandSeries {
    let values: Vec<f64> = (0..12).map(|i| 10.0 + i as f64).collect();
    monthly_series(function, d(2024, 1, 1), &values)
}

#[test]
fn test_short_history_is_unavailable_not_error() {
    let short = monthly_series("Clinical", d(2025, 1, 1), &[4.0, 5.0, 6.0, 5.0, 4.0]);
    let outcomes = api().forecast_demand(&[short]);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        outcomes[0],
        ForecastOutcome::Unavailable {
            function: "Clinical".to_string(),
            reason: ForecastUnavailableReason::InsufficientHistory {
                required: 8,
                actual: 5
            }
        }
    );
}

#[test]
fn test_forecast_each_function_in_order() {
    let short = monthly_series("Clinical", d(2025, 1, 1), &[4.0, 5.0, 6.0]);
    let outcomes = api().forecast_demand(&[rising("Software R&D"), short]);

    assert_eq!(outcomes.len(), 2);
    let forecast = outcomes[0].forecast().unwrap();
    assert_eq!(forecast.function, "Software R&D");
    assert_eq!(forecast.points.len(), 12);
    assert_eq!(forecast.confidence, 0.8);
    assert!((forecast.points[0].point - 22.0).abs() < 1e-6);
    assert_eq!(forecast.points[0].period, Some(d(2025, 1, 1)));
    assert_eq!(forecast.points[11].period, Some(d(2025, 12, 1)));
    for p in &forecast.points {
        assert!(p.lower >= 0.0);
        assert!(p.lower <= p.point && p.point <= p.upper);
    }
    assert!(!outcomes[1].is_available());
}

#[test]
fn test_unordered_points_are_sorted() {
    let ordered = rising("Assay R&D");
    let mut shuffled = ordered.clone();
    shuffled.points.reverse();
    shuffled.points.swap(2, 7);

    let outcomes = api().forecast_demand(&[ordered, shuffled]);
    assert_eq!(outcomes[0], outcomes[1]);
}

#[test]
fn test_capacity_gaps_per_function() {
    let mut capacities = BTreeMap::new();
    capacities.insert("Software R&D".to_string(), 25.0);
    capacities.insert("Assay R&D".to_string(), 500.0);

    let series = vec![
        rising("Software R&D"),
        rising("Assay R&D"),
        rising("Manufacturing"),
    ];
    let gaps = api().capacity_gaps(&series, &capacities);

    // 只有 Software R&D 出现缺口；Manufacturing 未提供产能
    assert_eq!(gaps.len(), 1);
    let gap = &gaps["Software R&D"];
    assert_eq!(gap.step, 12);
    assert!((gap.gap_fte - 8.0).abs() < 1e-6);
    assert_eq!(gap.period, Some(d(2025, 12, 1)));
}

#[test]
fn test_daily_periods_are_inferred() {
    let points = (0..10)
        .map(|i| DemandPoint {
            period: d(2025, 3, 1) + chrono::Duration::days(7 * i),
            fte: 6.0,
        })
        .collect();
    let series = DemandSeries::new("RA/QA", points);

    let manager = ConfigManager::from_kv([(config_keys::FORECAST_HORIZON, "2")]);
    let api = PortfolioApi::from_config_manager(&manager).unwrap();
    let outcomes = api.forecast_demand(&[series]);
    let forecast = outcomes[0].forecast().unwrap();

    assert_eq!(forecast.points.len(), 2);
    assert!((forecast.points[0].point - 6.0).abs() < 1e-9);
    assert_eq!(forecast.points[0].period, Some(d(2025, 5, 10)));
    assert_eq!(forecast.points[1].period, Some(d(2025, 5, 17)));
}
