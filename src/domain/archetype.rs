// ==========================================
// 项目组合决策引擎 - 项目原型（聚类）领域模型
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ProjectArchetype - 项目原型
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectArchetype {
    pub archetype_id: usize,
    pub label: String,
    /// 原型中心（原始单位）: 特征名 -> 均值
    pub centroid: BTreeMap<String, f64>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeResult {
    pub archetypes: Vec<ProjectArchetype>,
    /// 项目ID -> 原型ID
    pub assignments: BTreeMap<String, usize>,
    pub iterations: usize,
}

impl ArchetypeResult {
    pub fn archetype_of(&self, project_id: &str) -> Option<&ProjectArchetype> {
        let id = self.assignments.get(project_id)?;
        self.archetypes.iter().find(|a| a.archetype_id == *id)
    }
}
