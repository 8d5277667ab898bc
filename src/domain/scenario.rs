// ==========================================
// 项目组合决策引擎 - 情景（What-If 沙盘）领域模型
// ==========================================
// 每个情景持有独立的项目表副本，互不影响
// 情景之间不存在共享可变状态
// ==========================================

use crate::domain::alert::PortfolioAlert;
use crate::domain::project::Project;
use crate::domain::score::ScoreRecord;
use crate::domain::selection::{ConstraintSet, SelectionResult};
use crate::domain::types::ObjectiveKind;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ScenarioAction - 情景动作
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// 取消项目：从项目表移除，释放其资源分配
    Cancel { project_id: String },
    /// 加速项目：预测完成日期提前 days 天
    Accelerate { project_id: String, days: i64 },
}

impl ScenarioAction {
    pub fn project_id(&self) -> &str {
        match self {
            ScenarioAction::Cancel { project_id } => project_id,
            ScenarioAction::Accelerate { project_id, .. } => project_id,
        }
    }
}

// ==========================================
// Scenario - 情景
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,
    pub name: String,
    pub as_of: NaiveDate,
    pub projects: Vec<Project>,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
    #[serde(default)]
    pub objective: ObjectiveKind,
    pub constraints: ConstraintSet,
}

impl Scenario {
    /// 基于项目表创建情景（项目表被复制，不引用外部数据）
    pub fn new(
        name: &str,
        as_of: NaiveDate,
        projects: &[Project],
        objective: ObjectiveKind,
        constraints: ConstraintSet,
    ) -> Self {
        Self {
            scenario_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            as_of,
            projects: projects.to_vec(),
            actions: Vec::new(),
            objective,
            constraints,
        }
    }

    pub fn with_action(mut self, action: ScenarioAction) -> Self {
        self.actions.push(action);
        self
    }

    /// 应用情景动作，得到该情景下的项目表
    ///
    /// # 返回
    /// (项目表, 未匹配或无法应用的动作说明)
    pub fn materialize(&self) -> (Vec<Project>, Vec<String>) {
        let mut projects = self.projects.clone();
        let mut diagnostics = Vec::new();

        for action in &self.actions {
            let pos = projects
                .iter()
                .position(|p| p.project_id == action.project_id());
            let Some(idx) = pos else {
                diagnostics.push(format!(
                    "SCENARIO_ACTION_UNMATCHED: project_id={}",
                    action.project_id()
                ));
                continue;
            };

            match action {
                ScenarioAction::Cancel { .. } => {
                    projects.remove(idx);
                }
                ScenarioAction::Accelerate { project_id, days } => {
                    let project = &mut projects[idx];
                    let Some(base) = project.forecast_end.or(project.planned_end) else {
                        continue;
                    };
                    // 天数来自外部输入，日期越界时保持原值
                    let shifted =
                        Duration::try_days(*days).and_then(|delta| base.checked_sub_signed(delta));
                    match shifted {
                        Some(shifted) => project.forecast_end = Some(shifted),
                        None => diagnostics.push(format!(
                            "SCENARIO_ACTION_INVALID: project_id={}, days={}",
                            project_id, days
                        )),
                    }
                }
            }
        }

        (projects, diagnostics)
    }

    /// 情景下的约束集
    ///
    /// 被取消的项目不应保留在强制纳入集合中
    pub fn effective_constraints(&self) -> ConstraintSet {
        let mut constraints = self.constraints.clone();
        for action in &self.actions {
            if let ScenarioAction::Cancel { project_id } = action {
                constraints.forced_include.remove(project_id);
                constraints.forced_exclude.remove(project_id);
            }
        }
        constraints
    }
}

// ==========================================
// ScenarioOutcome - 情景评估结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario_id: String,
    pub name: String,
    pub scores: Vec<ScoreRecord>,
    pub selection: SelectionResult,
    pub alerts: Vec<PortfolioAlert>,
    /// 未匹配的动作等提示
    pub diagnostics: Vec<String>,
}
