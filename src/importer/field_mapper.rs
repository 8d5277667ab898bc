// ==========================================
// 项目组合决策引擎 - 字段映射器
// ==========================================
// 职责: 源列名 → Project 字段映射 + 类型转换
// 约定:
// - 列名不区分大小写，支持常见别名
// - 空单元格映射为 None，交由评分引擎判定是否可评分
// - "fte:<职能>" 列映射为资源分配
// ==========================================

use crate::domain::project::Project;
use crate::domain::types::{DeliveryOutcome, Phase};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::str::FromStr;

/// 资源分配列前缀
pub const ALLOCATION_PREFIX: &str = "fte:";

/// 标准字段 → 可接受的源列名
fn aliases(key: &str) -> &'static [&'static str] {
    match key {
        "project_id" => &["project_id", "id", "项目id", "项目编号"],
        "name" => &["name", "project_name", "项目名称"],
        "budget" => &["budget", "budget_usd", "bac", "预算"],
        "actual_spend" => &["actual_spend", "actuals_usd", "actuals", "ac", "实际支出"],
        "earned_value" => &["earned_value", "ev_usd", "ev", "挣值"],
        "planned_value" => &["planned_value", "pv_usd", "pv", "计划值"],
        "planned_start" => &["planned_start", "start_date", "计划开始"],
        "planned_end" => &["planned_end", "end_date", "计划完成"],
        "forecast_end" => &["forecast_end", "actual_end", "预测完成"],
        "phase" => &["phase", "阶段"],
        "risk_count" => &["risk_count", "open_risks", "风险数"],
        "strategic_value" => &["strategic_value", "战略价值"],
        "strategic_goal_id" => &["strategic_goal_id", "goal_id", "goal", "战略目标"],
        "on_time_rate" => &["on_time_rate", "historical_on_time_rate", "按期率"],
        "final_outcome" => &["final_outcome", "outcome", "交付结果"],
        _ => &[],
    }
}

pub struct ProjectFieldMapper;

impl ProjectFieldMapper {
    /// 将一行原始记录映射为 Project
    ///
    /// # 参数
    /// - `row`: 原始行
    /// - `row_number`: 数据行号（从 1 开始，不含表头）
    pub fn map_to_project(&self, row: &RawRow, row_number: usize) -> ImportResult<Project> {
        let project_id = self
            .get_string(row, "project_id")
            .ok_or(ImportError::PrimaryKeyMissing(row_number))?;

        Ok(Project {
            project_id,
            name: self.get_string(row, "name"),

            budget: self.parse_f64(row, "budget", row_number)?,
            actual_spend: self.parse_f64(row, "actual_spend", row_number)?,
            earned_value: self.parse_f64(row, "earned_value", row_number)?,
            planned_value: self.parse_f64(row, "planned_value", row_number)?,

            planned_start: self.parse_date(row, "planned_start", row_number)?,
            planned_end: self.parse_date(row, "planned_end", row_number)?,
            forecast_end: self.parse_date(row, "forecast_end", row_number)?,
            phase: self.parse_enum::<Phase>(row, "phase", row_number)?,

            allocations: self.parse_allocations(row, row_number)?,

            risk_count: self.parse_i32(row, "risk_count", row_number)?,
            strategic_value: self.parse_f64(row, "strategic_value", row_number)?,
            strategic_goal_id: self.get_string(row, "strategic_goal_id"),
            on_time_rate: self.parse_f64(row, "on_time_rate", row_number)?,

            final_outcome: self.parse_enum::<DeliveryOutcome>(row, "final_outcome", row_number)?,
        })
    }

    /// 提取字符串字段，依次尝试所有别名
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        for alias in aliases(key) {
            let hit = row
                .iter()
                .find(|(column, _)| column.trim().eq_ignore_ascii_case(alias));
            if let Some((_, v)) = hit {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// 解析浮点数（允许千分位逗号与 $ 前缀）
    fn parse_f64(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => parse_number(&value)
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 解析整数（Excel 数值单元格可能带 .0）
    fn parse_i32(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<Option<i32>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<i32>()
                .ok()
                .or_else(|| {
                    value
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                        .map(|f| f as i32)
                })
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为整数: {}", value),
                }),
        }
    }

    /// 解析日期（YYYY-MM-DD / YYYYMMDD / YYYY/MM/DD）
    fn parse_date(
        &self,
        row: &RawRow,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => parse_date(&value)
                .map(Some)
                .ok_or_else(|| ImportError::DateFormatError {
                    row: row_number,
                    field: key.to_string(),
                    value: value.clone(),
                }),
        }
    }

    fn parse_enum<T>(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<Option<T>>
    where
        T: FromStr<Err = String>,
    {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|message| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message,
                }),
        }
    }

    /// 解析 "fte:<职能>" 列
    fn parse_allocations(
        &self,
        row: &RawRow,
        row_number: usize,
    ) -> ImportResult<BTreeMap<String, f64>> {
        let mut allocations = BTreeMap::new();
        for (column, value) in row {
            let column = column.trim();
            let Some(prefix) = column.get(..ALLOCATION_PREFIX.len()) else {
                continue;
            };
            if !prefix.eq_ignore_ascii_case(ALLOCATION_PREFIX) {
                continue;
            }
            let function = column[ALLOCATION_PREFIX.len()..].trim();
            let value = value.trim();
            if function.is_empty() || value.is_empty() {
                continue;
            }
            let fte = parse_number(value).ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: column.to_string(),
                message: format!("无法解析为 FTE: {}", value),
            })?;
            allocations.insert(function.to_string(), fte);
        }
        Ok(allocations)
    }
}

pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok()
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    // Excel 日期单元格可能带时间部分
    let date_part = value.split([' ', 'T']).next().unwrap_or(value);
    ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}
