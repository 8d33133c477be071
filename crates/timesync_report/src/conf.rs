//! Environment keys, defaults and the fixed report view catalog.

use std::time::Duration;

////////////////////////////////////////////////////////////////////////////////
// #region DatabaseEnvironment

pub const C_ENV_DB_HOST: &str = "DB_HOST";
pub const C_ENV_DB_PORT: &str = "DB_PORT";
pub const C_ENV_DB_USER: &str = "DB_USER";
pub const C_ENV_DB_PASS: &str = "DB_PASS";
pub const C_ENV_DB_NAME: &str = "DB_NAME";

pub const C_DB_HOST_DEFAULT: &str = "localhost";
pub const N_DB_PORT_DEFAULT: u16 = 3306;
pub const C_DB_USER_DEFAULT: &str = "teste";
pub const C_DB_PASS_DEFAULT: &str = "urubu100";
pub const C_DB_NAME_DEFAULT: &str = "Timesync";

/// Connection attempts before giving up.
pub const N_RETRY_ATTEMPTS_MAX: u32 = 12;
/// Pause between two failed connection attempts.
pub const DUR_RETRY_DELAY: Duration = Duration::from_secs(5);

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Delivery

/// Script mode output file.
pub const C_FILE_OUT_DEFAULT: &str = "Relatorio_Timesync_Completo.xlsx";
/// Prefix of the timestamped download name served over HTTP.
pub const C_FILE_DOWNLOAD_PREFIX: &str = "Relatorio_Timesync";

pub const C_HOST_SERVE_DEFAULT: &str = "0.0.0.0";
pub const N_PORT_SERVE_DEFAULT: u16 = 5000;

pub const C_ROUTE_EXPORT: &str = "/api/exportar-relatorio";
pub const C_ROUTE_HEALTH: &str = "/api/health";

pub const C_MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const C_SERVICE_NAME: &str = "relatorio-export";
pub const C_STATUS_HEALTHY: &str = "healthy";
pub const C_EXPORT_ERROR: &str = "Falha ao gerar relatório";

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ViewCatalog

/// Sheet name of the consolidated summary.
pub const C_SHEET_SUMMARY: &str = "Resumo Completo";

/// The four database views exported by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumReportView {
    ProjectReport,
    ResourceAllocation,
    EfficiencyIndicators,
    MonthlyComparison,
}

impl EnumReportView {
    /// Views in query and sheet order.
    pub const ALL: [EnumReportView; 4] = [
        EnumReportView::ProjectReport,
        EnumReportView::ResourceAllocation,
        EnumReportView::EfficiencyIndicators,
        EnumReportView::MonthlyComparison,
    ];

    /// Database view queried with `SELECT *`.
    pub fn view_name(self) -> &'static str {
        match self {
            EnumReportView::ProjectReport => "vw_relatorio_projeto",
            EnumReportView::ResourceAllocation => "vw_alocacao_recursos",
            EnumReportView::EfficiencyIndicators => "vw_indicadores_eficiencia",
            EnumReportView::MonthlyComparison => "vw_comparativo_mensal",
        }
    }

    /// Title of the dedicated sheet.
    pub fn sheet_name(self) -> &'static str {
        match self {
            EnumReportView::ProjectReport => "Relatório de Projeto",
            EnumReportView::ResourceAllocation => "Alocação de Recursos",
            EnumReportView::EfficiencyIndicators => "Indicadores de Eficiência",
            EnumReportView::MonthlyComparison => "Comparativo Mensal",
        }
    }
}

/// Summary sections `(view, banner title)` in rendering order.
///
/// The project report feeds the title band instead of a section.
pub const TUP_SUMMARY_SECTIONS: [(EnumReportView, &str); 3] = [
    (EnumReportView::ResourceAllocation, "ALOCAÇÃO DE RECURSOS"),
    (
        EnumReportView::EfficiencyIndicators,
        "INDICADORES DE EFICIÊNCIA (PWC)",
    ),
    (EnumReportView::MonthlyComparison, "COMPARATIVO MENSAL"),
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
