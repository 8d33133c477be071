//! Shared report specification models.

use std::collections::BTreeMap;

use rust_xlsxwriter::XlsxError;

use crate::conf::EnumFmtKey;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Partial cell format; `None` fields fall back to the base format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    pub font_size: Option<i64>,
    pub bold: Option<bool>,
    /// `"left"`, `"center"` or `"right"`.
    pub align: Option<String>,
    /// `"vcenter"`.
    pub valign: Option<String>,
    /// 1 thin, 2 medium, 5 thick, applied to all four sides.
    pub border: Option<i64>,
    /// `#RRGGBB` fill.
    pub bg_color: Option<String>,
    /// `#RRGGBB` font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    ///
    /// Fields set in `patch` win; `None` fields keep the value of `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: patch.font_size.or(self.font_size),
            bold: patch.bold.or(self.bold),
            align: patch.align.or_else(|| self.align.clone()),
            valign: patch.valign.or_else(|| self.valign.clone()),
            border: patch.border.or(self.border),
            bg_color: patch.bg_color.or_else(|| self.bg_color.clone()),
            font_color: patch.font_color.or_else(|| self.font_color.clone()),
        }
    }
}

/// Immutable style set of one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportStyles {
    /// Summary title band.
    pub title: SpecCellFormat,
    /// Section banner.
    pub banner: SpecCellFormat,
    /// Dataset sheet header row.
    pub header: SpecCellFormat,
    /// Summary section header row.
    pub header_section: SpecCellFormat,
    /// Advisory block header row.
    pub header_advisory: SpecCellFormat,
    /// Body cell.
    pub body: SpecCellFormat,
}

impl SpecReportStyles {
    /// Resolve a preset key to its format.
    pub fn get(&self, key: EnumFmtKey) -> &SpecCellFormat {
        match key {
            EnumFmtKey::Title => &self.title,
            EnumFmtKey::Banner => &self.banner,
            EnumFmtKey::Header => &self.header,
            EnumFmtKey::HeaderSection => &self.header_section,
            EnumFmtKey::HeaderAdvisory => &self.header_advisory,
            EnumFmtKey::Body => &self.body,
        }
    }
}

/// Normalized cell value during the layout/write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Whether the cell shows nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            EnumCellValue::None => true,
            EnumCellValue::String(s) => s.is_empty(),
            EnumCellValue::Number(_) | EnumCellValue::Boolean(_) => false,
        }
    }

    /// Text used for display-width estimation.
    pub fn to_display_text(&self) -> String {
        match self {
            EnumCellValue::None => String::new(),
            EnumCellValue::String(s) => s.clone(),
            EnumCellValue::Number(n) => n.to_string(),
            EnumCellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetPlanSpecification

/// One planned cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Format preset.
    pub fmt: EnumFmtKey,
}

/// Single-row merged range carrying one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetHorizontalMerge {
    pub row_idx_start: usize,
    pub col_idx_start: usize,
    /// Inclusive.
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
    /// Format preset.
    pub fmt: EnumFmtKey,
}

impl SpecSheetHorizontalMerge {
    /// Whether `(row_idx, col_idx)` falls inside this merge, anchor included.
    pub fn contains(&self, row_idx: usize, col_idx: usize) -> bool {
        row_idx == self.row_idx_start && (self.col_idx_start..=self.col_idx_end).contains(&col_idx)
    }
}

/// Deterministic in-memory layout of one sheet, zero-based coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetPlan {
    /// Requested sheet name.
    pub sheet_name: String,
    /// Non-merged cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecSheetCell>,
    /// Merged ranges.
    pub merges: Vec<SpecSheetHorizontalMerge>,
    /// Final column widths; columns without populated cells are absent.
    pub widths_by_col: BTreeMap<usize, usize>,
}

impl SpecSheetPlan {
    /// Create an empty plan.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..Default::default()
        }
    }

    /// Place one cell.
    pub fn set_cell(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        value: EnumCellValue,
        fmt: EnumFmtKey,
    ) {
        self.cells
            .insert((row_idx, col_idx), SpecSheetCell { value, fmt });
    }

    /// Place one merged single-row range.
    pub fn add_merge(
        &mut self,
        row_idx: usize,
        col_idx_start: usize,
        col_idx_end: usize,
        text: impl Into<String>,
        fmt: EnumFmtKey,
    ) {
        self.merges.push(SpecSheetHorizontalMerge {
            row_idx_start: row_idx,
            col_idx_start,
            col_idx_end,
            text: text.into(),
            fmt,
        });
    }

    /// Cell at `(row, col)`, if planned.
    pub fn get_cell(&self, row_idx: usize, col_idx: usize) -> Option<&SpecSheetCell> {
        self.cells.get(&(row_idx, col_idx))
    }

    /// Merge covering `(row, col)`, if any.
    pub fn get_merge(&self, row_idx: usize, col_idx: usize) -> Option<&SpecSheetHorizontalMerge> {
        self.merges.iter().find(|m| m.contains(row_idx, col_idx))
    }

    /// Number of used rows (last used row + 1).
    pub fn height(&self) -> usize {
        let n_rows_cells = self.cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0);
        let n_rows_merges = self
            .merges
            .iter()
            .map(|m| m.row_idx_start + 1)
            .max()
            .unwrap_or(0);
        usize::max(n_rows_cells, n_rows_merges)
    }

    /// Number of used columns (last used column + 1).
    pub fn width(&self) -> usize {
        let n_cols_cells = self.cells.keys().map(|(_, c)| c + 1).max().unwrap_or(0);
        let n_cols_merges = self
            .merges
            .iter()
            .map(|m| m.col_idx_end + 1)
            .max()
            .unwrap_or(0);
        usize::max(n_cols_cells, n_cols_merges)
    }

    /// Display texts of the planned cells in `row_idx`, in column order.
    pub fn row_texts(&self, row_idx: usize) -> Vec<String> {
        self.cells
            .range((row_idx, 0)..(row_idx + 1, 0))
            .map(|(_, cell)| cell.value.to_display_text())
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Name the sheet ended up with after sanitizing and deduplication.
    pub sheet_name: String,
    /// Rows written.
    pub height: usize,
    /// Columns written.
    pub width: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Errors raised while planning or writing a workbook.
#[derive(Debug, thiserror::Error)]
pub enum XlsxReportError {
    /// Underlying workbook encoder failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Row index beyond the encoder range.
    #[error("row index overflow: {0}")]
    RowOverflow(usize),
    /// Column index beyond the encoder range.
    #[error("column index overflow: {0}")]
    ColumnOverflow(usize),
    /// Failed to read a value out of a DataFrame.
    #[error("failed to access cell value: {0}")]
    CellAccess(String),
    /// Writer was used after the workbook was serialized.
    #[error("cannot write after the workbook was saved")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_extent_counts_cells_and_merges() {
        let mut plan = SpecSheetPlan::new("S");
        plan.add_merge(0, 0, 10, "title", EnumFmtKey::Title);
        plan.set_cell(3, 1, "x".into(), EnumFmtKey::Body);

        assert_eq!(plan.height(), 4);
        assert_eq!(plan.width(), 11);
        assert!(plan.get_merge(0, 10).is_some());
        assert!(plan.get_merge(1, 0).is_none());
        assert_eq!(plan.row_texts(3), vec!["x".to_string()]);
        assert!(plan.row_texts(2).is_empty());
    }

    #[test]
    fn test_cell_value_emptiness_and_display() {
        assert!(EnumCellValue::None.is_empty());
        assert!(EnumCellValue::String(String::new()).is_empty());
        assert!(!EnumCellValue::Number(0.0).is_empty());
        assert_eq!(EnumCellValue::Number(12.0).to_display_text(), "12");
        assert_eq!(EnumCellValue::Number(1.5).to_display_text(), "1.5");
        assert_eq!(EnumCellValue::Boolean(true).to_display_text(), "TRUE");
    }

    #[test]
    fn test_format_patch_overrides_only_set_fields() {
        let base = SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            bg_color: Some("#7030A0".to_string()),
            ..Default::default()
        };
        let fmt = base.with_(SpecCellFormat {
            font_size: Some(14),
            bg_color: Some("#D9D9D9".to_string()),
            ..Default::default()
        });

        assert_eq!(fmt.font_size, Some(14));
        assert_eq!(fmt.bold, Some(true));
        assert_eq!(fmt.align.as_deref(), Some("center"));
        assert_eq!(fmt.bg_color.as_deref(), Some("#D9D9D9"));
        assert_eq!(fmt.border, None);
    }
}
