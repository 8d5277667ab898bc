// ==========================================
// 项目组合决策引擎 - 分支定界求解
// ==========================================
// 相同候选项合并为一组，按组取整数个（对称解只搜索一次）
// 组按 收益/预算 降序；每个节点从最多可选数量向 0 枚举
// 上界 = 当前收益 + 剩余可单独放入项目的分数背包收益
// ==========================================

use super::formulation::{fits_within, Candidate};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;

/// 截止时间检查间隔（节点数）
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone)]
pub(super) struct SearchOutcome {
    /// 选中的候选项（输入位置，升序）
    pub chosen: Vec<usize>,
    pub nodes: u64,
    pub timed_out: bool,
}

// ==========================================
// Group - 收益/预算/FTE 完全相同的候选项合并为一个整数变量
// ==========================================
#[derive(Debug, Clone)]
struct Group {
    /// 组内输入位置（升序），选 m 个时取前 m 个
    slots: Vec<usize>,
    gain: f64,
    budget: f64,
    fte: Vec<f64>,
}

impl Group {
    fn ratio(&self) -> f64 {
        if self.budget > 0.0 {
            self.gain / self.budget
        } else {
            f64::INFINITY
        }
    }

    fn fits_one(&self, budget_left: f64, caps_left: &[f64]) -> bool {
        self.fits_many(1, budget_left, caps_left)
    }

    fn fits_many(&self, m: usize, budget_left: f64, caps_left: &[f64]) -> bool {
        let m = m as f64;
        fits_within(m * self.budget, budget_left)
            && self
                .fte
                .iter()
                .zip(caps_left)
                .all(|(need, left)| fits_within(m * need, *left))
    }

    /// 当前剩余容量下最多可选的数量
    fn max_take(&self, budget_left: f64, caps_left: &[f64]) -> usize {
        let mut m = self.slots.len();
        while m > 0 && !self.fits_many(m, budget_left, caps_left) {
            m -= 1;
        }
        m
    }
}

fn group_key(c: &Candidate) -> Vec<u64> {
    let mut key = Vec::with_capacity(2 + c.fte.len());
    key.push(c.gain.to_bits());
    key.push(c.budget.to_bits());
    key.extend(c.fte.iter().map(|f| f.to_bits()));
    key
}

/// 合并相同候选项，按 收益/预算 降序（预算为 0 视为无穷大，并列按组内最小输入位置）
fn group_candidates(candidates: Vec<Candidate>) -> Vec<Group> {
    let mut index: HashMap<Vec<u64>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for c in candidates {
        let key = group_key(&c);
        if let Some(&g) = index.get(&key) {
            groups[g].slots.push(c.slot);
            continue;
        }
        index.insert(key, groups.len());
        groups.push(Group {
            slots: vec![c.slot],
            gain: c.gain,
            budget: c.budget,
            fte: c.fte,
        });
    }
    for g in &mut groups {
        g.slots.sort_unstable();
    }
    groups.sort_by(|a, b| {
        b.ratio()
            .partial_cmp(&a.ratio())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.slots[0].cmp(&b.slots[0]))
    });
    groups
}

#[derive(Debug, Clone)]
struct Incumbent {
    takes: Vec<usize>,
    gain: f64,
    count: usize,
    budget: f64,
}

struct Search<'a> {
    groups: &'a [Group],
    /// 收益全为整数时上界取整
    integral: bool,
    /// suffix_max_gain[k] = groups[k..] 的最大单项收益
    suffix_max_gain: Vec<f64>,
    /// cheapest[k][j] = groups[k..] 中最便宜 j 个项目的预算和
    cheapest: Vec<Vec<f64>>,
    deadline: Instant,
    nodes: u64,
    timed_out: bool,
    current: Vec<usize>,
    best: Incumbent,
}

/// 求解
///
/// 初始可行解为不选任何候选项（即仅强制纳入项目）
pub(super) fn search(
    candidates: Vec<Candidate>,
    budget_left: f64,
    caps_left: &[f64],
    deadline: Instant,
) -> SearchOutcome {
    let groups = group_candidates(candidates);
    let n = groups.len();
    let integral = groups
        .iter()
        .all(|g| g.gain.fract() == 0.0 && g.gain.abs() < 1e15);

    let mut suffix_max_gain = vec![f64::NEG_INFINITY; n + 1];
    let mut cheapest = vec![vec![0.0]; n + 1];
    let mut budgets: Vec<f64> = Vec::new();
    for k in (0..n).rev() {
        suffix_max_gain[k] = suffix_max_gain[k + 1].max(groups[k].gain);
        budgets.extend(std::iter::repeat(groups[k].budget).take(groups[k].slots.len()));
        budgets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mut sums = Vec::with_capacity(budgets.len() + 1);
        sums.push(0.0);
        let mut acc = 0.0;
        for b in &budgets {
            acc += b;
            sums.push(acc);
        }
        cheapest[k] = sums;
    }

    let mut s = Search {
        groups: &groups,
        integral,
        suffix_max_gain,
        cheapest,
        deadline,
        nodes: 0,
        timed_out: false,
        current: vec![0; n],
        best: Incumbent {
            takes: vec![0; n],
            gain: 0.0,
            count: 0,
            budget: 0.0,
        },
    };

    let mut caps = caps_left.to_vec();
    s.dfs(0, 0.0, 0, 0.0, budget_left, &mut caps);

    let mut chosen: Vec<usize> = groups
        .iter()
        .zip(&s.best.takes)
        .flat_map(|(g, &m)| g.slots[..m].iter().copied())
        .collect();
    chosen.sort_unstable();

    SearchOutcome {
        chosen,
        nodes: s.nodes,
        timed_out: s.timed_out,
    }
}

impl<'a> Search<'a> {
    fn tolerance(&self) -> f64 {
        1e-9 * self.best.gain.abs().max(1.0)
    }

    /// 当前解是否优于已知最优（收益 → 资助数 → 预算）
    fn improves(&self, gain: f64, count: usize, budget: f64) -> bool {
        let tol = self.tolerance();
        if gain > self.best.gain + tol {
            return true;
        }
        if gain < self.best.gain - tol {
            return false;
        }
        match count.cmp(&self.best.count) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => budget < self.best.budget - 1e-9 * self.best.budget.abs().max(1.0),
        }
    }

    /// 分数背包上界（仅预算行松弛，FTE 行只做单项可行过滤）
    fn bound(&self, k: usize, budget_left: f64, caps_left: &[f64]) -> f64 {
        let mut room = budget_left;
        let mut extra = 0.0;
        for g in &self.groups[k..] {
            if !g.fits_one(budget_left, caps_left) {
                continue;
            }
            let m = g.slots.len() as f64;
            if fits_within(m * g.budget, room) {
                room -= m * g.budget;
                extra += m * g.gain;
            } else {
                if g.budget > 0.0 && room > 0.0 {
                    extra += g.gain * room / g.budget;
                }
                break;
            }
        }
        extra
    }

    /// 上界无法严格超过已知最优时，子树只能靠并列规则胜出
    ///
    /// 追平收益至少还需 needed 个项目（按剩余最大单项收益估计），
    /// 额外预算不少于剩余最便宜 needed 个项目之和
    fn cannot_win_tie(&self, k: usize, gain: f64, count: usize, spent: f64) -> bool {
        let tol = self.tolerance();
        let needed = if gain < self.best.gain - tol {
            let per_item = self.suffix_max_gain[k];
            if per_item <= 0.0 {
                return true;
            }
            ((self.best.gain - gain - tol) / per_item).ceil().max(1.0) as usize
        } else {
            0
        };
        let Some(&extra_budget) = self.cheapest[k].get(needed) else {
            return true;
        };

        let min_count = count + needed;
        let budget_tol = 1e-9 * self.best.budget.abs().max(1.0);
        min_count > self.best.count
            || (min_count == self.best.count
                && spent + extra_budget >= self.best.budget - budget_tol)
    }

    fn dfs(
        &mut self,
        k: usize,
        gain: f64,
        count: usize,
        spent: f64,
        budget_left: f64,
        caps_left: &mut Vec<f64>,
    ) {
        if self.timed_out {
            return;
        }
        self.nodes += 1;
        if (self.nodes == 1 || self.nodes % DEADLINE_CHECK_INTERVAL == 0)
            && Instant::now() >= self.deadline
        {
            self.timed_out = true;
            return;
        }

        if k == self.groups.len() {
            if self.improves(gain, count, spent) {
                self.best = Incumbent {
                    takes: self.current.clone(),
                    gain,
                    count,
                    budget: spent,
                };
            }
            return;
        }

        // 剪枝
        let mut bound = gain + self.bound(k, budget_left, caps_left);
        if self.integral {
            bound = (bound + 1e-6).floor();
        }
        let tol = self.tolerance();
        if bound < self.best.gain - tol {
            return;
        }
        if bound <= self.best.gain + tol && self.cannot_win_tie(k, gain, count, spent) {
            return;
        }

        let groups = self.groups;
        let group = &groups[k];
        let saved = caps_left.clone();

        // 先多选后少选，最后一次为全部排除
        for m in (0..=group.max_take(budget_left, caps_left)).rev() {
            if self.timed_out {
                return;
            }
            let take = m as f64;
            for (left, need) in caps_left.iter_mut().zip(&group.fte) {
                *left -= take * need;
            }
            self.current[k] = m;
            self.dfs(
                k + 1,
                gain + take * group.gain,
                count + m,
                spent + take * group.budget,
                budget_left - take * group.budget,
                caps_left,
            );
            self.current[k] = 0;
            caps_left.copy_from_slice(&saved);
        }
    }
}
