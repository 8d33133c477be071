//! Stateless helper utilities used by the layout and writer kernels.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};

use crate::conf::{
    C_COLNAME_PROJECT, C_NAME_PROJECT_PLACEHOLDER, C_TITLE_PREFIX, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_WIDTH_CELL_PADDING, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, SpecSheetPlan, XlsxReportError};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize one DataFrame value into a cell value. Values are kept verbatim.
pub fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => {
            if val.is_finite() {
                EnumCellValue::Number(val)
            } else {
                EnumCellValue::String(val.to_string())
            }
        }
        _ => EnumCellValue::String(value.to_string()),
    }
}

/// Read cell `(row, col)` of `df` as a normalized value.
pub fn derive_cell_value(
    df: &DataFrame,
    row_idx: usize,
    col_idx: usize,
) -> Result<EnumCellValue, XlsxReportError> {
    let value = df.get_columns()[col_idx]
        .get(row_idx)
        .map_err(|err| XlsxReportError::CellAccess(err.to_string()))?;
    Ok(derive_cell_value_from_any_value(value))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnAutofit

/// Displayed width of a text: one unit per character.
pub fn estimate_text_width(s: &str) -> usize {
    s.chars().count()
}

/// Derive column widths as `longest non-empty cell text + padding`.
///
/// A merged range counts once, with its text on its first column; the other
/// columns it spans ignore it. Columns without any text are omitted.
pub fn calculate_column_widths(plan: &SpecSheetPlan) -> BTreeMap<usize, usize> {
    let mut dict_width_by_col: BTreeMap<usize, usize> = BTreeMap::new();

    let l_cell_texts = plan
        .cells
        .iter()
        .filter(|((row_idx, col_idx), cell)| {
            !cell.value.is_empty() && plan.get_merge(*row_idx, *col_idx).is_none()
        })
        .map(|((_, col_idx), cell)| (*col_idx, cell.value.to_display_text()));
    let l_merge_texts = plan
        .merges
        .iter()
        .filter(|merge| !merge.text.is_empty())
        .map(|merge| (merge.col_idx_start, merge.text.clone()));

    for (col_idx, c_text) in l_cell_texts.chain(l_merge_texts) {
        let n_width = estimate_text_width(&c_text);
        let n_width_recorded = dict_width_by_col.entry(col_idx).or_insert(0);
        *n_width_recorded = usize::max(*n_width_recorded, n_width);
    }

    dict_width_by_col
        .into_iter()
        .map(|(col_idx, n_width)| (col_idx, n_width + N_WIDTH_CELL_PADDING))
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace characters Excel rejects, trim, and cut to the sheet-name limit.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let c_name = TUP_EXCEL_ILLEGAL
        .iter()
        .fold(name.to_string(), |c_acc, c_illegal| c_acc.replace(*c_illegal, replace_to));
    let c_name = c_name.trim();
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TitleDerivation

/// Derive the project label of the summary title from the project dataset.
///
/// - missing name column, no rows, or only blank names: placeholder
/// - one distinct name: that name, uppercased
/// - several distinct names: `"<count> Projects"`
pub fn derive_project_label(df: &DataFrame) -> Result<String, XlsxReportError> {
    let Ok(col) = df.column(C_COLNAME_PROJECT) else {
        return Ok(C_NAME_PROJECT_PLACEHOLDER.to_string());
    };

    let mut set_names = BTreeSet::new();
    for n_idx_row in 0..col.len() {
        let value = col
            .get(n_idx_row)
            .map_err(|err| XlsxReportError::CellAccess(err.to_string()))?;
        let value = derive_cell_value_from_any_value(value);
        if !value.is_empty() {
            set_names.insert(value.to_display_text());
        }
    }

    Ok(match set_names.len() {
        0 => C_NAME_PROJECT_PLACEHOLDER.to_string(),
        1 => set_names
            .into_iter()
            .next()
            .map(|c_name| c_name.to_uppercase())
            .unwrap_or_else(|| C_NAME_PROJECT_PLACEHOLDER.to_string()),
        n_names => format!("{n_names} Projects"),
    })
}

/// Uppercased `"<MONTH> <YEAR>"` label of `date`.
pub fn derive_month_year_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string().to_uppercase()
}

/// Summary title band text.
pub fn derive_report_title(project_label: &str, month_year_label: &str) -> String {
    format!("{C_TITLE_PREFIX} {project_label} - {month_year_label}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;
    use crate::conf::EnumFmtKey;

    fn create_project_frame(names: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(C_COLNAME_PROJECT.into(), names),
            Column::new("horas".into(), vec![1i64; names.len()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_project_label_single_name_is_uppercased() {
        let df = create_project_frame(&[Some("Alpha"), Some("Alpha")]);
        assert_eq!(derive_project_label(&df).unwrap(), "ALPHA");
    }

    #[test]
    fn test_project_label_counts_distinct_names() {
        let df = create_project_frame(&[Some("Alpha"), Some("Beta"), Some("Alpha")]);
        assert_eq!(derive_project_label(&df).unwrap(), "2 Projects");
    }

    #[test]
    fn test_project_label_falls_back_to_placeholder() {
        let df_empty = create_project_frame(&[]);
        assert_eq!(
            derive_project_label(&df_empty).unwrap(),
            C_NAME_PROJECT_PLACEHOLDER
        );

        let df_nulls = create_project_frame(&[None, None]);
        assert_eq!(
            derive_project_label(&df_nulls).unwrap(),
            C_NAME_PROJECT_PLACEHOLDER
        );

        let df_no_col = DataFrame::new(vec![Column::new("other".into(), ["x"])]).unwrap();
        assert_eq!(
            derive_project_label(&df_no_col).unwrap(),
            C_NAME_PROJECT_PLACEHOLDER
        );
    }

    #[test]
    fn test_report_title_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let c_title = derive_report_title("ALPHA", &derive_month_year_label(date));
        assert_eq!(c_title, "MONTHLY REPORT FOR PROJECT ALPHA - OCTOBER 2026");
    }

    #[test]
    fn test_column_widths_count_merge_text_on_first_column_only() {
        let mut plan = SpecSheetPlan::new("S");
        plan.add_merge(0, 0, 10, "a very long merged banner text", EnumFmtKey::Banner);
        plan.set_cell(1, 0, "id".into(), EnumFmtKey::Header);
        plan.set_cell(1, 1, "descrição".into(), EnumFmtKey::Header);
        plan.set_cell(2, 0, EnumCellValue::Number(12345.0), EnumFmtKey::Body);
        plan.set_cell(2, 1, EnumCellValue::None, EnumFmtKey::Body);
        plan.set_cell(2, 2, EnumCellValue::None, EnumFmtKey::Body);

        let dict_widths = calculate_column_widths(&plan);
        assert_eq!(
            dict_widths.get(&0),
            Some(&("a very long merged banner text".len() + 2))
        );
        assert_eq!(dict_widths.get(&1), Some(&11));
        assert_eq!(dict_widths.get(&2), None);
        assert_eq!(dict_widths.get(&10), None);
        assert_eq!(dict_widths.len(), 2);
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(
            sanitize_sheet_name(&"x".repeat(40), "_").chars().count(),
            N_LEN_EXCEL_SHEET_NAME_MAX
        );
    }

    #[test]
    fn test_any_value_conversion_keeps_values_verbatim() {
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Float64(2.345)),
            EnumCellValue::Number(2.345)
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::String("x")),
            EnumCellValue::String("x".to_string())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Null),
            EnumCellValue::None
        );
    }
}
