//! Workbook writer that commits sheet plans to XLSX output.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX};
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecReportStyles, SpecSheetPlan, SpecXlsxReport,
    XlsxReportError,
};
use crate::util::sanitize_sheet_name;

/// Workbook under construction, one sheet per committed plan.
///
/// The workbook is buffered in memory until [`Self::save`] or
/// [`Self::save_to_buffer`] is called. No default sheet is created.
pub struct XlsxWriter {
    workbook: Workbook,
    dict_formats: BTreeMap<EnumFmtKey, Format>,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer with the given style presets.
    pub fn new(styles: &SpecReportStyles) -> Self {
        let dict_formats = EnumFmtKey::ALL
            .into_iter()
            .map(|key| (key, derive_rust_xlsx_format(styles.get(key))))
            .collect();

        Self {
            workbook: Workbook::new(),
            dict_formats,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Per-sheet write reports, in sheet order.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.l_reports
            .iter()
            .map(|report| report.sheet_name.clone())
            .collect()
    }

    /// Serialize the workbook into memory.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxReportError> {
        let v_bytes = self.workbook.save_to_buffer()?;
        self.if_closed = true;
        Ok(v_bytes)
    }

    /// Serialize the workbook to `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), XlsxReportError> {
        self.workbook.save(path)?;
        self.if_closed = true;
        Ok(())
    }

    /// Add one sheet and write `plan` into it.
    pub fn write_sheet_plan(&mut self, plan: &SpecSheetPlan) -> Result<(), XlsxReportError> {
        if self.if_closed {
            return Err(XlsxReportError::Closed);
        }

        let mut report = SpecXlsxReport {
            height: plan.height(),
            width: plan.width(),
            ..Default::default()
        };

        let c_sheet_name_clean = sanitize_sheet_name(&plan.sheet_name, "_");
        if c_sheet_name_clean != plan.sheet_name {
            report.warn(format!(
                "Sheet name {:?} sanitized to {c_sheet_name_clean:?}.",
                plan.sheet_name
            ));
        }
        let sheet_name_unique = self.derive_unique_sheet_name(&c_sheet_name_clean);
        if sheet_name_unique != c_sheet_name_clean {
            report.warn(format!(
                "Sheet name {c_sheet_name_clean:?} already used; renamed to {sheet_name_unique:?}."
            ));
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        for ((row_idx, col_idx), cell) in &plan.cells {
            write_cell_with_format(
                worksheet,
                *row_idx,
                *col_idx,
                &cell.value,
                &self.dict_formats[&cell.fmt],
            )?;
        }

        for merge in &plan.merges {
            worksheet.merge_range(
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_start)?,
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_end)?,
                &merge.text,
                &self.dict_formats[&merge.fmt],
            )?;
        }

        for (col_idx, n_width) in &plan.widths_by_col {
            worksheet.set_column_width(cast_col_num(*col_idx)?, *n_width as f64)?;
        }

        report.sheet_name = sheet_name_unique;
        self.l_reports.push(report);
        Ok(())
    }

    /// `name`, or `name` truncated and suffixed `__<n>` until unused.
    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        let mut c_candidate = name.to_string();
        let mut n_suffix = 1usize;
        while self.set_sheet_names_existing.contains(&c_candidate) {
            n_suffix += 1;
            let c_suffix = format!("__{n_suffix}");
            let n_keep = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.chars().count());
            c_candidate = name.chars().take(n_keep).chain(c_suffix.chars()).collect();
        }
        self.set_sheet_names_existing.insert(c_candidate.clone());
        c_candidate
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxReportError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(n_size) = spec.font_size {
        format = format.set_font_size(n_size as f64);
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    for c_align in [&spec.align, &spec.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(c_align) {
            format = format.set_align(align);
        }
    }
    if let Some(c_color) = spec.bg_color.as_deref() {
        format = format.set_background_color(c_color);
    }
    if let Some(c_color) = spec.font_color.as_deref() {
        format = format.set_font_color(c_color);
    }
    if let Some(n_border) = spec.border {
        format = format.set_border(derive_format_border(n_border));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        5 => FormatBorder::Thick,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let align = match align.trim() {
        "left" => FormatAlign::Left,
        "center" => FormatAlign::Center,
        "right" => FormatAlign::Right,
        "vcenter" => FormatAlign::VerticalCenter,
        _ => return None,
    };
    Some(align)
}

fn cast_row_num(value: usize) -> Result<u32, XlsxReportError> {
    u32::try_from(value).map_err(|_| XlsxReportError::RowOverflow(value))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxReportError> {
    u16::try_from(value).map_err(|_| XlsxReportError::ColumnOverflow(value))
}
