// ==========================================
// 项目组合决策引擎 - 导入层
// ==========================================
// 职责: 外部文件 → 引擎输入
// 支持: Excel, CSV, JSON
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod project_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::ProjectFieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use project_loader::{
    load_constraints, DemandHistoryLoader, ProjectLoadReport, ProjectTableLoader, RejectedRow,
};
