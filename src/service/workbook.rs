//! 上传表格解析
//!
//! 读取第一个工作表, 第一行为表头; 数据列依次为: 序号, 描述, 数量, 单位。

use crate::error::{BoqError, Result};
use crate::models::{RowDiagnostic, SourceRow};
use bigdecimal::BigDecimal;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::str::FromStr;

const COL_ITEM_NO: usize = 0;
const COL_DESCRIPTION: usize = 1;
const COL_QUANTITY: usize = 2;
const COL_UNIT: usize = 3;

static EMPTY_CELL: Data = Data::Empty;

/// 解析结果: 有效行 + 被跳过行的原因
#[derive(Debug, Default)]
pub struct ParsedSheet {
    pub rows: Vec<SourceRow>,
    pub skipped: Vec<RowDiagnostic>,
}

/// 从上传的字节解析表格 (xlsx / xls / ods)
pub fn read_source_rows(bytes: &[u8]) -> Result<ParsedSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| BoqError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| BoqError::Workbook("workbook has no sheets".to_string()))?
        .map_err(|e| BoqError::Workbook(e.to_string()))?;

    // range 从第一个非空单元格开始
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut parsed = ParsedSheet::default();
    for (idx, cells) in range.rows().enumerate().skip(1) {
        let row_number = first_row + idx + 1;
        match parse_row(row_number, cells) {
            Ok(Some(row)) => parsed.rows.push(row),
            Ok(None) => {}
            Err(reason) => {
                tracing::debug!("Skipping row {}: {}", row_number, reason);
                parsed.skipped.push(RowDiagnostic { row_number, reason });
            }
        }
    }

    tracing::info!(
        "Parsed workbook: {} rows accepted, {} skipped",
        parsed.rows.len(),
        parsed.skipped.len()
    );
    Ok(parsed)
}

/// 在阻塞线程池中解析, 解压和读取大表格不占用异步工作线程
pub async fn read_source_rows_blocking(bytes: Vec<u8>) -> Result<ParsedSheet> {
    tokio::task::spawn_blocking(move || read_source_rows(&bytes)).await?
}

/// 解析单行; 整行为空返回 `Ok(None)`
fn parse_row(row_number: usize, cells: &[Data]) -> std::result::Result<Option<SourceRow>, String> {
    let cell = |col: usize| cells.get(col).unwrap_or(&EMPTY_CELL);

    if cells.iter().all(|c| cell_text(c).is_empty()) {
        return Ok(None);
    }

    let description = cell_text(cell(COL_DESCRIPTION));
    if description.is_empty() {
        return Err("missing description".to_string());
    }

    let quantity = parse_quantity(cell(COL_QUANTITY))?;

    let unit = cell_text(cell(COL_UNIT));
    if unit.is_empty() {
        return Err("missing unit".to_string());
    }

    Ok(Some(SourceRow {
        row_number,
        item_no: cell_text(cell(COL_ITEM_NO)),
        description,
        quantity,
        unit,
    }))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// 数量必须是 >= 0 的有限数字; 文本允许千位分隔符
fn parse_quantity(cell: &Data) -> std::result::Result<BigDecimal, String> {
    let quantity = match cell {
        Data::Int(n) => BigDecimal::from(*n),
        Data::Float(f) if f.is_finite() => BigDecimal::from_str(&f.to_string())
            .map_err(|e| format!("invalid quantity {}: {}", f, e))?,
        Data::String(s) => {
            let text = s.trim().replace(',', "");
            if text.is_empty() {
                return Err("missing quantity".to_string());
            }
            BigDecimal::from_str(&text).map_err(|_| format!("invalid quantity \"{}\"", s.trim()))?
        }
        Data::Empty => return Err("missing quantity".to_string()),
        other => return Err(format!("invalid quantity \"{}\"", cell_text(other))),
    };

    if quantity < BigDecimal::from(0) {
        return Err(format!("negative quantity {}", quantity));
    }
    Ok(quantity)
}
