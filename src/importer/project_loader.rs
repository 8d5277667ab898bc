// ==========================================
// 项目组合决策引擎 - 项目表 / 需求历史加载器
// ==========================================
// 职责: 文件 → 引擎输入 (Vec<Project> / Vec<DemandSeries> / ConstraintSet)
// 单行映射失败不影响其他行，失败行记录在加载报告中
// ==========================================

use crate::domain::forecast::{DemandPoint, DemandSeries};
use crate::domain::project::Project;
use crate::domain::selection::ConstraintSet;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{parse_date, parse_number, ProjectFieldMapper};
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

// ==========================================
// LoadReport - 加载报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize,
    /// 出错字段（无法定位时为 None）
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectLoadReport {
    pub projects: Vec<Project>,
    pub rejected: Vec<RejectedRow>,
}

// ==========================================
// ProjectTableLoader - 项目表加载器
// ==========================================
pub struct ProjectTableLoader {
    parser: UniversalFileParser,
    mapper: ProjectFieldMapper,
}

impl ProjectTableLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: ProjectFieldMapper,
        }
    }

    /// 加载项目表
    ///
    /// 支持 .csv / .xlsx / .xls / .json（JSON 为 Project 数组）
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ImportResult<ProjectLoadReport> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let report = if is_json {
            if !path.exists() {
                return Err(ImportError::FileNotFound(path.display().to_string()));
            }
            let raw = std::fs::read_to_string(path)?;
            ProjectLoadReport {
                projects: serde_json::from_str(&raw)?,
                rejected: Vec::new(),
            }
        } else {
            self.map_rows(&self.parser.parse(path)?)
        };

        info!(
            path = %path.display(),
            loaded = report.projects.len(),
            rejected = report.rejected.len(),
            "项目表加载完成"
        );
        Ok(report)
    }

    /// 将原始行映射为项目（行号从 1 开始）
    pub fn map_rows(&self, rows: &[RawRow]) -> ProjectLoadReport {
        let mut projects = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let row_number = i + 1;
            match self.mapper.map_to_project(row, row_number) {
                Ok(p) => projects.push(p),
                Err(e) => {
                    warn!(row = row_number, error = %e, "项目行映射失败");
                    rejected.push(RejectedRow {
                        row: e.row().unwrap_or(row_number),
                        field: e.field().map(str::to_string),
                        message: e.to_string(),
                    });
                }
            }
        }
        ProjectLoadReport { projects, rejected }
    }
}

impl Default for ProjectTableLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// DemandHistoryLoader - 职能需求历史加载器
// ==========================================
// 列: period/date, function/role, fte/demand_fte
// 同一职能同一期间的多行累加
pub struct DemandHistoryLoader {
    parser: UniversalFileParser,
}

fn column<'a>(row: &'a RawRow, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        row.iter()
            .find(|(c, _)| c.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    })
}

impl DemandHistoryLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
        }
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<DemandSeries>> {
        let rows = self.parser.parse(path.as_ref())?;
        let series = self.map_rows(&rows)?;
        info!(
            path = %path.as_ref().display(),
            functions = series.len(),
            "需求历史加载完成"
        );
        Ok(series)
    }

    /// 原始行 → 按职能分组的时间序列（职能名排序，期间升序）
    pub fn map_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<DemandSeries>> {
        let mut grouped: BTreeMap<String, BTreeMap<chrono::NaiveDate, f64>> = BTreeMap::new();

        for (i, row) in rows.iter().enumerate() {
            let row_number = i + 1;
            let period_raw = column(row, &["period", "date", "ds", "期间"])
                .ok_or_else(|| ImportError::MissingColumn("period".to_string()))?;
            let function = column(row, &["function", "role", "职能"])
                .ok_or_else(|| ImportError::MissingColumn("function".to_string()))?;
            let fte_raw = column(row, &["fte", "demand_fte", "allocated_fte", "需求fte"])
                .ok_or_else(|| ImportError::MissingColumn("fte".to_string()))?;

            let period = parse_date(period_raw).ok_or_else(|| ImportError::DateFormatError {
                row: row_number,
                field: "period".to_string(),
                value: period_raw.to_string(),
            })?;
            let fte = parse_number(fte_raw).ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: "fte".to_string(),
                message: format!("无法解析为 FTE: {}", fte_raw),
            })?;

            *grouped
                .entry(function.to_string())
                .or_default()
                .entry(period)
                .or_insert(0.0) += fte;
        }

        Ok(grouped
            .into_iter()
            .map(|(function, points)| {
                DemandSeries::new(
                    &function,
                    points
                        .into_iter()
                        .map(|(period, fte)| DemandPoint { period, fte })
                        .collect(),
                )
            })
            .collect())
    }
}

impl Default for DemandHistoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 JSON 文件加载约束集
pub fn load_constraints<P: AsRef<Path>>(path: P) -> ImportResult<ConstraintSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
