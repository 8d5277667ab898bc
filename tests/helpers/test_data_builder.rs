// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use pmo_portfolio_engine::domain::forecast::{DemandPoint, DemandSeries};
use pmo_portfolio_engine::domain::project::Project;
use pmo_portfolio_engine::domain::types::{DeliveryOutcome, Phase};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// 默认评估日期
pub fn as_of() -> NaiveDate {
    d(2025, 7, 1)
}

// ==========================================
// Project 构建器
// ==========================================
// 默认值构成一个可评分的开发阶段项目
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(project_id: &str) -> Self {
        let mut project = Project::new(project_id);
        project.name = Some(format!("Project {}", project_id));
        project.budget = Some(2_000_000.0);
        project.actual_spend = Some(1_000_000.0);
        project.planned_start = Some(d(2025, 1, 1));
        project.planned_end = Some(d(2026, 1, 1));
        project.phase = Some(Phase::Development);
        project.risk_count = Some(3);
        project.strategic_value = Some(5.0);
        project.on_time_rate = Some(0.8);
        project
            .allocations
            .insert("Software R&D".to_string(), 2.0);
        Self { project }
    }

    pub fn budget(mut self, budget: f64) -> Self {
        self.project.budget = Some(budget);
        self
    }

    pub fn actual_spend(mut self, spend: f64) -> Self {
        self.project.actual_spend = Some(spend);
        self
    }

    pub fn earned_value(mut self, ev: f64) -> Self {
        self.project.earned_value = Some(ev);
        self
    }

    pub fn schedule(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.project.planned_start = Some(start);
        self.project.planned_end = Some(end);
        self
    }

    pub fn forecast_end(mut self, end: NaiveDate) -> Self {
        self.project.forecast_end = Some(end);
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.project.phase = Some(phase);
        self
    }

    pub fn allocation(mut self, function: &str, fte: f64) -> Self {
        self.project.allocations.insert(function.to_string(), fte);
        self
    }

    pub fn no_allocations(mut self) -> Self {
        self.project.allocations.clear();
        self
    }

    pub fn risk_count(mut self, count: i32) -> Self {
        self.project.risk_count = Some(count);
        self
    }

    pub fn strategic_value(mut self, value: f64) -> Self {
        self.project.strategic_value = Some(value);
        self
    }

    pub fn goal(mut self, goal_id: &str) -> Self {
        self.project.strategic_goal_id = Some(goal_id.to_string());
        self
    }

    pub fn on_time_rate(mut self, rate: f64) -> Self {
        self.project.on_time_rate = Some(rate);
        self
    }

    pub fn outcome(mut self, outcome: DeliveryOutcome) -> Self {
        self.project.final_outcome = Some(outcome);
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}

// ==========================================
// DemandSeries 构建器（月度）
// ==========================================
pub fn monthly_series(function: &str, start: NaiveDate, values: &[f64]) -> DemandSeries {
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| DemandPoint {
            period: start
                .checked_add_months(chrono::Months::new(i as u32))
                .unwrap(),
            fte: *v,
        })
        .collect();
    DemandSeries::new(function, points)
}
