// ==========================================
// 项目成本挣值管理系统 - 导入层
// ==========================================
// 职责: 外部台账数据导入 (成本条目 / 承付款)
// 支持: CSV
// ==========================================

pub mod csv_importer;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use csv_importer::CsvLedgerImporter;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, RawRecord};
