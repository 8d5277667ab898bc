// ==========================================
// 项目组合决策引擎 - 组合优化引擎
// ==========================================
// 职责: 在预算、职能 FTE、强制纳入/排除约束下选择资助项目
// 输入: 已评分项目 + 优化目标 + 约束集
// 输出: SelectionResult (Optimal / Infeasible / TimedOut)
// ==========================================
// 红线: 强制纳入项目永不被丢弃，无法满足时报告 Infeasible
// 红线: 同一输入得到同一选择（并列时: 资助数少者优先，再按占用预算低者优先）
// ==========================================
// 求解: 0-1 变量深度优先分支定界，上界取预算行的分数背包松弛
// ==========================================

mod branch_bound;
mod formulation;
mod solver;

#[cfg(test)]
mod tests;

pub use solver::PortfolioOptimizer;
