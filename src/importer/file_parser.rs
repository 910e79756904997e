// ==========================================
// 项目成本挣值管理系统 - CSV 文件解析器
// ==========================================
// 阶段 0: 文件读取 → 以表头为键的原始行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行: (文件行号, 表头 → 去空白后的单元格)
pub type RawRecord = (usize, HashMap<String, String>);

pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件
    ///
    /// # 返回
    /// - Ok(Vec<RawRecord>): 非空白行
    /// - Err(FileNotFound / UnsupportedFormat / CsvParseError)
    pub fn parse_path(&self, path: &Path) -> ImportResult<Vec<RawRecord>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
            }
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// 解析任意 CSV 输入流
    pub fn parse_reader<R: Read>(&self, input: R) -> ImportResult<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            // 表头占第 1 行
            records.push((row_idx + 2, row_map));
        }

        Ok(records)
    }
}
