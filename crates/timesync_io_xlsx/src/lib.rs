//! `timesync_io_xlsx` v1:
//! Spreadsheet kernel of the Timesync monthly report.
//!
//! Module layout:
//! - `conf`   : constants, fixed report literals and style presets
//! - `spec`   : formats, cell values, sheet plans and errors
//! - `util`   : pure helper functions
//! - `layout` : sheet renderer and summary composer (plan builders)
//! - `writer` : commits sheet plans to a workbook
pub mod conf;
pub mod layout;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_NAME_PROJECT_PLACEHOLDER, EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_BANNER_MERGE,
    TUP_ADVISORY_ROWS, derive_default_report_styles,
};
pub use layout::{SpecSectionLayout, compose_summary_sheet, plan_table_sheet};
pub use spec::{
    EnumCellValue, SpecCellFormat, SpecReportStyles, SpecSheetCell, SpecSheetHorizontalMerge,
    SpecSheetPlan, SpecXlsxReport, XlsxReportError,
};
pub use util::{
    calculate_column_widths, derive_month_year_label, derive_project_label, derive_report_title,
    sanitize_sheet_name,
};
pub use writer::XlsxWriter;
