//! Report orchestration: connect, fetch, render, serialize.

use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use chrono::{Local, NaiveDate};
use polars::prelude::DataFrame;
use sqlx::Connection;
use timesync_io_xlsx::{SpecReportStyles, XlsxWriter, compose_summary_sheet, plan_table_sheet};
use tracing::{info, warn};

use crate::conf::{C_SHEET_SUMMARY, EnumReportView, TUP_SUMMARY_SECTIONS};
use crate::connector::connect_with_retry;
use crate::source::fetch_report_views;
use crate::spec::{ReportError, SpecReportContext, SpecReportData};

/// Boxed fetch future borrowing the connection for `'c`.
pub type FetchFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, ReportError>> + Send + 'c>>;

/// Run `fetch` on `conn`, then hand `conn` to `close` exactly once.
///
/// `close` runs whether or not `fetch` succeeded. A close failure is only
/// logged; the fetch result is returned unchanged.
pub async fn fetch_then_close<C, T, F, G, GFut, E>(
    mut conn: C,
    fetch: F,
    close: G,
) -> Result<T, ReportError>
where
    F: for<'c> FnOnce(&'c mut C) -> FetchFuture<'c, T>,
    G: FnOnce(C) -> GFut,
    GFut: Future<Output = Result<(), E>>,
    E: Display,
{
    let res_data = fetch(&mut conn).await;
    if let Err(err) = close(conn).await {
        warn!(error = %err, "failed to close database connection");
    }
    res_data
}

/// Connect, fetch all four views and close the connection.
pub async fn fetch_report_data(ctx: &SpecReportContext) -> Result<SpecReportData, ReportError> {
    let conn = connect_with_retry(&ctx.db, &ctx.retry).await?;
    fetch_then_close(
        conn,
        |conn| Box::pin(fetch_report_views(conn)),
        |conn| conn.close(),
    )
    .await
}

/// Lay out the four dataset sheets and the summary sheet into a new workbook.
pub fn render_report_workbook(
    data: &SpecReportData,
    date: NaiveDate,
    styles: &SpecReportStyles,
) -> Result<XlsxWriter, ReportError> {
    let mut writer = XlsxWriter::new(styles);

    for view in EnumReportView::ALL {
        writer.write_sheet_plan(&plan_table_sheet(data.get(view), view.sheet_name())?)?;
    }

    let l_sections: Vec<(&str, &DataFrame)> = TUP_SUMMARY_SECTIONS
        .iter()
        .map(|(view, c_title)| (*c_title, data.get(*view)))
        .collect();
    let plan_summary = compose_summary_sheet(
        C_SHEET_SUMMARY,
        data.get(EnumReportView::ProjectReport),
        &l_sections,
        date,
    )?;
    writer.write_sheet_plan(&plan_summary)?;

    for report in writer.report() {
        for c_warning in &report.warnings {
            warn!(sheet = %report.sheet_name, "{c_warning}");
        }
    }
    Ok(writer)
}

/// Render `data` and serialize the workbook into memory.
pub fn render_report_bytes(
    data: &SpecReportData,
    date: NaiveDate,
    styles: &SpecReportStyles,
) -> Result<Vec<u8>, ReportError> {
    let mut writer = render_report_workbook(data, date, styles)?;
    let v_bytes = writer.save_to_buffer()?;
    info!(bytes = v_bytes.len(), "report workbook serialized");
    Ok(v_bytes)
}

/// [`render_report_bytes`] on the blocking thread pool.
pub async fn spawn_render_report_bytes(
    data: SpecReportData,
    date: NaiveDate,
    styles: SpecReportStyles,
) -> Result<Vec<u8>, ReportError> {
    tokio::task::spawn_blocking(move || render_report_bytes(&data, date, &styles)).await?
}

/// Full pipeline to an in-memory XLSX package.
pub async fn build_report_bytes(ctx: &SpecReportContext) -> Result<Vec<u8>, ReportError> {
    let data = fetch_report_data(ctx).await?;
    spawn_render_report_bytes(data, Local::now().date_naive(), ctx.styles.clone()).await
}

/// Full pipeline to a file at `path`. Nothing is written when any step fails.
pub async fn build_report_file(ctx: &SpecReportContext, path: &Path) -> Result<(), ReportError> {
    let data = fetch_report_data(ctx).await?;
    let date = Local::now().date_naive();
    let styles = ctx.styles.clone();
    let path_out = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<(), ReportError> {
        let mut writer = render_report_workbook(&data, date, &styles)?;
        writer.save(&path_out)?;
        info!(path = %path_out.display(), "report workbook saved");
        Ok(())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use polars::df;
    use timesync_io_xlsx::derive_default_report_styles;

    use super::*;

    fn create_report_data() -> SpecReportData {
        SpecReportData {
            df_project: df!(
                "nome_projeto" => ["Alpha", "Alpha"],
                "horas_previstas" => [120.0, 80.0],
                "horas_realizadas" => [132.5, 75.0],
            )
            .unwrap(),
            df_resources: df!(
                "colaborador" => ["Ana", "Bruno", "Carla"],
                "alocacao_pct" => [100i64, 50, 75],
            )
            .unwrap(),
            df_efficiency: df!(
                "indicador" => ["Aderência"],
                "valor" => [0.91],
            )
            .unwrap(),
            df_comparison: df!(
                "mes" => ["2026-09", "2026-10"],
                "custo" => [1000.0, 1100.0],
            )
            .unwrap(),
        }
    }

    fn create_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_render_creates_five_sheets_in_order() {
        let data = create_report_data();
        let writer = render_report_workbook(&data, create_date(), &derive_default_report_styles())
            .unwrap();

        assert_eq!(
            writer.sheet_names(),
            vec![
                "Relatório de Projeto",
                "Alocação de Recursos",
                "Indicadores de Eficiência",
                "Comparativo Mensal",
                "Resumo Completo",
            ]
        );

        let l_reports = writer.report();
        for (report, view) in l_reports.iter().zip(EnumReportView::ALL) {
            assert_eq!(report.height, data.get(view).height() + 1);
            assert_eq!(report.width, data.get(view).width());
            assert!(report.warnings.is_empty());
        }
    }

    #[test]
    fn test_render_with_empty_views_still_has_summary() {
        let data = SpecReportData::default();
        let v_bytes =
            render_report_bytes(&data, create_date(), &derive_default_report_styles()).unwrap();

        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_summary_layout_of_populated_views() {
        let data = create_report_data();
        let l_sections: Vec<(&str, &DataFrame)> = TUP_SUMMARY_SECTIONS
            .iter()
            .map(|(view, c_title)| (*c_title, data.get(*view)))
            .collect();
        let plan = compose_summary_sheet(
            C_SHEET_SUMMARY,
            &data.df_project,
            &l_sections,
            create_date(),
        )
        .unwrap();

        assert_eq!(
            plan.get_merge(0, 0).map(|m| m.text.as_str()),
            Some("MONTHLY REPORT FOR PROJECT ALPHA - OCTOBER 2026")
        );
        // Resources: banner 2, header 3, 3 rows, next banner at 2 + 3 + 4.
        assert_eq!(
            plan.get_merge(2, 0).map(|m| m.text.as_str()),
            Some("ALOCAÇÃO DE RECURSOS")
        );
        assert_eq!(
            plan.get_merge(9, 0).map(|m| m.text.as_str()),
            Some("INDICADORES DE EFICIÊNCIA (PWC)")
        );
        assert_eq!(
            plan.get_merge(14, 0).map(|m| m.text.as_str()),
            Some("COMPARATIVO MENSAL")
        );
        assert_eq!(
            plan.get_merge(20, 0).map(|m| m.text.as_str()),
            Some("OBSERVAÇÕES AUTOMÁTICAS")
        );
    }

    #[tokio::test]
    async fn test_connection_closed_once_after_successful_fetch() {
        let n_closes = Cell::new(0u32);

        let res: Result<u32, ReportError> = fetch_then_close(
            0u32,
            |n_fetches| {
                Box::pin(async move {
                    *n_fetches += 1;
                    Ok(*n_fetches)
                })
            },
            |n_fetches| {
                n_closes.set(n_closes.get() + 1);
                async move {
                    assert_eq!(n_fetches, 1);
                    Ok::<(), sqlx::Error>(())
                }
            },
        )
        .await;

        assert_eq!(res.unwrap(), 1);
        assert_eq!(n_closes.get(), 1);
    }

    #[tokio::test]
    async fn test_connection_closed_once_after_failed_query() {
        let n_closes = Cell::new(0u32);

        let res: Result<u32, ReportError> = fetch_then_close(
            0u32,
            |n_fetches| {
                Box::pin(async move {
                    *n_fetches += 1;
                    Err(ReportError::Query {
                        view: "vw_alocacao_recursos".to_string(),
                        source: sqlx::Error::RowNotFound,
                    })
                })
            },
            |n_fetches| {
                n_closes.set(n_closes.get() + 1);
                async move {
                    assert_eq!(n_fetches, 1);
                    Ok::<(), sqlx::Error>(())
                }
            },
        )
        .await;

        assert!(matches!(
            res,
            Err(ReportError::Query { ref view, .. }) if view == "vw_alocacao_recursos"
        ));
        assert_eq!(n_closes.get(), 1);
    }

    #[tokio::test]
    async fn test_close_failure_keeps_fetched_data() {
        let res: Result<u32, ReportError> = fetch_then_close(
            7u32,
            |n_val| Box::pin(async move { Ok(*n_val) }),
            |_| async { Err(sqlx::Error::PoolClosed) },
        )
        .await;

        assert_eq!(res.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_render_runs_on_blocking_pool() {
        let v_bytes = spawn_render_report_bytes(
            create_report_data(),
            create_date(),
            derive_default_report_styles(),
        )
        .await
        .unwrap();

        assert!(v_bytes.starts_with(b"PK"));
    }
}
