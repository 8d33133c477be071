//! Report constants, fixed literals and default style presets.

use crate::spec::{SpecCellFormat, SpecReportStyles};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

////////////////////////////////////////////////////////////////////////////////
// #region LayoutConstants

/// Number of columns spanned by title and section banners (A..K).
///
/// Fixed width, independent of how many columns a dataset has.
pub const N_NCOLS_BANNER_MERGE: usize = 11;
/// Zero-based row of the first summary section banner (spreadsheet row 3).
pub const N_ROW_IDX_SECTIONS_START: usize = 2;
/// Blank rows left after each summary section.
pub const N_NROWS_SECTION_GAP: usize = 2;
/// Width padding added to the longest cell text of a column.
pub const N_WIDTH_CELL_PADDING: usize = 2;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportLiterals

/// Column carrying the project name in the project report dataset.
pub const C_COLNAME_PROJECT: &str = "nome_projeto";
/// Project label used when no project name can be derived.
pub const C_NAME_PROJECT_PLACEHOLDER: &str = "PROJETO";
/// Leading text of the summary title band.
pub const C_TITLE_PREFIX: &str = "MONTHLY REPORT FOR PROJECT";
/// Banner text of the advisory block.
pub const C_TITLE_ADVISORY: &str = "OBSERVAÇÕES AUTOMÁTICAS";
/// Header row of the advisory block.
pub const TUP_ADVISORY_HEADER: [&str; 2] = ["Situation", "Message"];
/// Static advisory rows `(situation, message)`, rendered in this order.
pub const TUP_ADVISORY_ROWS: [(&str, &str); 3] = [
    (
        "Actual cost exceeds estimate by 10%",
        "Project is over the month's planned budget.",
    ),
    (
        "Error rate exceeds 5%",
        "Time-entry inconsistencies detected; review contributors with high error rates.",
    ),
    (
        "Adherence below 85%",
        "Scheduled hours are under target; risk of delay detected.",
    ),
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StylePresets

/// Purple fill shared by headers, title and banners.
pub const C_COLOR_FILL_HEADER: &str = "#7030A0";
/// Light-gray fill of summary section header rows.
pub const C_COLOR_FILL_SECTION_HEADER: &str = "#D9D9D9";
/// Font color used on purple fills.
pub const C_COLOR_FONT_ON_FILL: &str = "#FFFFFF";

/// Canonical format preset keys referenced by sheet plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumFmtKey {
    /// Summary title band.
    Title,
    /// Merged section banner.
    Banner,
    /// Header row of a dataset sheet.
    Header,
    /// Header row of a summary section.
    HeaderSection,
    /// Header row of the advisory block.
    HeaderAdvisory,
    /// Bordered body cell.
    Body,
}

impl EnumFmtKey {
    /// All keys, in declaration order.
    pub const ALL: [EnumFmtKey; 6] = [
        EnumFmtKey::Title,
        EnumFmtKey::Banner,
        EnumFmtKey::Header,
        EnumFmtKey::HeaderSection,
        EnumFmtKey::HeaderAdvisory,
        EnumFmtKey::Body,
    ];
}

/// Build the immutable style set used by [`crate::writer::XlsxWriter`].
pub fn derive_default_report_styles() -> SpecReportStyles {
    let cfg_center_fmt_spec = SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_filled_fmt_spec = cfg_center_fmt_spec.with_(SpecCellFormat {
        bold: Some(true),
        bg_color: Some(C_COLOR_FILL_HEADER.to_string()),
        font_color: Some(C_COLOR_FONT_ON_FILL.to_string()),
        ..Default::default()
    });
    let cfg_section_header_fmt_spec = cfg_center_fmt_spec.with_(SpecCellFormat {
        bold: Some(true),
        bg_color: Some(C_COLOR_FILL_SECTION_HEADER.to_string()),
        ..Default::default()
    });

    SpecReportStyles {
        title: cfg_filled_fmt_spec.with_(SpecCellFormat {
            font_size: Some(14),
            ..Default::default()
        }),
        banner: cfg_filled_fmt_spec.with_(SpecCellFormat {
            font_size: Some(12),
            ..Default::default()
        }),
        header: cfg_filled_fmt_spec.with_(SpecCellFormat {
            border: Some(1),
            ..Default::default()
        }),
        header_section: cfg_section_header_fmt_spec.with_(SpecCellFormat {
            border: Some(1),
            ..Default::default()
        }),
        header_advisory: cfg_section_header_fmt_spec,
        body: SpecCellFormat {
            border: Some(1),
            ..Default::default()
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_styles_differ_from_body() {
        let styles = derive_default_report_styles();

        assert_ne!(styles.header, styles.body);
        assert_ne!(styles.header_section, styles.body);
        assert_eq!(styles.header.bold, Some(true));
        assert_eq!(styles.body.bold, None);
        assert_eq!(styles.title.font_size, Some(14));
        assert_eq!(styles.banner.font_size, Some(12));
        assert_eq!(
            styles.header_section.bg_color.as_deref(),
            Some(C_COLOR_FILL_SECTION_HEADER)
        );
    }
}
