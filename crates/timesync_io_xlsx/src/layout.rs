//! Sheet layout planners: one table per sheet, and the consolidated summary.

use chrono::NaiveDate;
use polars::prelude::DataFrame;

use crate::conf::{
    C_TITLE_ADVISORY, EnumFmtKey, N_NCOLS_BANNER_MERGE, N_NROWS_SECTION_GAP,
    N_ROW_IDX_SECTIONS_START, TUP_ADVISORY_HEADER, TUP_ADVISORY_ROWS,
};
use crate::spec::{EnumCellValue, SpecSheetPlan, XlsxReportError};
use crate::util::{
    calculate_column_widths, derive_cell_value, derive_month_year_label, derive_project_label,
    derive_report_title,
};

/// Plan a dataset sheet: styled header row, bordered body, autofit widths.
///
/// Column and row order follow `df` exactly.
pub fn plan_table_sheet(
    df: &DataFrame,
    sheet_name: &str,
) -> Result<SpecSheetPlan, XlsxReportError> {
    let mut plan = SpecSheetPlan::new(sheet_name);
    write_table(&mut plan, 0, df, EnumFmtKey::Header)?;
    plan.widths_by_col = calculate_column_widths(&plan);
    Ok(plan)
}

/// Place `df` at `row_idx_start`: header row first, then data rows.
///
/// Returns the number of rows written (header included).
fn write_table(
    plan: &mut SpecSheetPlan,
    row_idx_start: usize,
    df: &DataFrame,
    fmt_header: EnumFmtKey,
) -> Result<usize, XlsxReportError> {
    for (col_idx, c_name) in df.get_column_names_str().into_iter().enumerate() {
        plan.set_cell(row_idx_start, col_idx, c_name.into(), fmt_header);
    }

    for row_idx in 0..df.height() {
        for col_idx in 0..df.width() {
            let value = derive_cell_value(df, row_idx, col_idx)?;
            plan.set_cell(row_idx_start + 1 + row_idx, col_idx, value, EnumFmtKey::Body);
        }
    }

    Ok(df.height() + 1)
}

////////////////////////////////////////////////////////////////////////////////
// #region SummaryComposer

/// Row cursor over a summary sheet being composed.
///
/// The cursor only moves forward, so sections never overlap.
#[derive(Debug, Clone)]
pub struct SpecSectionLayout {
    row_cursor: usize,
    plan: SpecSheetPlan,
}

impl SpecSectionLayout {
    /// Start an empty layout with the cursor on the first section row.
    pub fn new(sheet_name: &str) -> Self {
        Self {
            row_cursor: N_ROW_IDX_SECTIONS_START,
            plan: SpecSheetPlan::new(sheet_name),
        }
    }

    /// Current zero-based cursor row.
    pub fn row_cursor(&self) -> usize {
        self.row_cursor
    }

    /// Merged title band on the first row.
    pub fn add_title(&mut self, text: &str) {
        self.plan
            .add_merge(0, 0, N_NCOLS_BANNER_MERGE - 1, text, EnumFmtKey::Title);
    }

    /// Banner + header + data rows, followed by the section gap.
    ///
    /// Returns the new cursor row, `start + rows + 4`.
    pub fn add_section(&mut self, title: &str, df: &DataFrame) -> Result<usize, XlsxReportError> {
        self.add_banner(title);
        let n_rows_table = write_table(
            &mut self.plan,
            self.row_cursor,
            df,
            EnumFmtKey::HeaderSection,
        )?;
        self.row_cursor += n_rows_table + N_NROWS_SECTION_GAP;
        Ok(self.row_cursor)
    }

    /// Advisory banner, `Situation`/`Message` header and the fixed rows.
    pub fn add_advisory_block(&mut self) {
        self.add_banner(C_TITLE_ADVISORY);

        for (col_idx, c_text) in TUP_ADVISORY_HEADER.iter().enumerate() {
            self.plan.set_cell(
                self.row_cursor,
                col_idx,
                (*c_text).into(),
                EnumFmtKey::HeaderAdvisory,
            );
        }
        self.row_cursor += 1;

        for (c_situation, c_message) in TUP_ADVISORY_ROWS {
            self.plan
                .set_cell(self.row_cursor, 0, c_situation.into(), EnumFmtKey::Body);
            self.plan
                .set_cell(self.row_cursor, 1, c_message.into(), EnumFmtKey::Body);
            self.row_cursor += 1;
        }
    }

    /// Autofit the whole sheet and return the plan.
    pub fn finish(mut self) -> SpecSheetPlan {
        self.plan.widths_by_col = calculate_column_widths(&self.plan);
        self.plan
    }

    fn add_banner(&mut self, title: &str) {
        self.plan.add_merge(
            self.row_cursor,
            0,
            N_NCOLS_BANNER_MERGE - 1,
            title,
            EnumFmtKey::Banner,
        );
        self.row_cursor += 1;
    }
}

/// Compose the consolidated summary sheet.
///
/// `df_project` feeds the title; `sections` are `(banner title, dataset)`
/// pairs rendered in the given order, followed by the advisory block.
pub fn compose_summary_sheet(
    sheet_name: &str,
    df_project: &DataFrame,
    sections: &[(&str, &DataFrame)],
    date: NaiveDate,
) -> Result<SpecSheetPlan, XlsxReportError> {
    let mut layout = SpecSectionLayout::new(sheet_name);

    let c_project_label = derive_project_label(df_project)?;
    layout.add_title(&derive_report_title(
        &c_project_label,
        &derive_month_year_label(date),
    ));

    for (c_title, df) in sections {
        layout.add_section(c_title, df)?;
    }
    layout.add_advisory_block();

    Ok(layout.finish())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
