//! Fetch the report views into polars DataFrames.
//!
//! Column names and order come from the prepared statement metadata, so a
//! view with no rows still yields its headers.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, PolarsResult, Series};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::mysql::MySqlRow;
use sqlx::{Column as _, Executor, MySqlConnection, Row, Statement, TypeInfo};
use tracing::info;

use crate::conf::EnumReportView;
use crate::spec::{ReportError, SpecReportData};

/// Value family of a MySQL column, derived from its type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMySqlKind {
    Null,
    Boolean,
    Int,
    UInt,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Time,
    Text,
}

impl EnumMySqlKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "NULL" => EnumMySqlKind::Null,
            "BOOLEAN" => EnumMySqlKind::Boolean,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => EnumMySqlKind::Int,
            "YEAR" => EnumMySqlKind::UInt,
            c_name if c_name.ends_with(" UNSIGNED") => EnumMySqlKind::UInt,
            "FLOAT" => EnumMySqlKind::Float,
            "DOUBLE" => EnumMySqlKind::Double,
            "DECIMAL" => EnumMySqlKind::Decimal,
            "DATE" => EnumMySqlKind::Date,
            "DATETIME" | "TIMESTAMP" => EnumMySqlKind::DateTime,
            "TIME" => EnumMySqlKind::Time,
            _ => EnumMySqlKind::Text,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region ViewQueries

/// Fetch the four report views, in catalog order, on one connection.
pub async fn fetch_report_views(conn: &mut MySqlConnection) -> Result<SpecReportData, ReportError> {
    let mut data = SpecReportData::default();
    for view in EnumReportView::ALL {
        let df = fetch_view(conn, view.view_name()).await?;
        info!(view = view.view_name(), rows = df.height(), "view fetched");
        data.set(view, df);
    }
    Ok(data)
}

/// Run `SELECT * FROM <view_name>` and collect the full result.
pub async fn fetch_view(
    conn: &mut MySqlConnection,
    view_name: &str,
) -> Result<DataFrame, ReportError> {
    let c_sql = format!("SELECT * FROM {view_name}");

    let statement = (&mut *conn)
        .prepare(c_sql.as_str())
        .await
        .map_err(|err| derive_query_error(view_name, err))?;
    let l_columns: Vec<(String, EnumMySqlKind)> = statement
        .columns()
        .iter()
        .map(|col| {
            (
                col.name().to_string(),
                EnumMySqlKind::from_type_name(col.type_info().name()),
            )
        })
        .collect();

    let l_rows = statement
        .query()
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| derive_query_error(view_name, err))?;

    let mut l_values_by_col: Vec<Vec<AnyValue<'static>>> =
        vec![Vec::with_capacity(l_rows.len()); l_columns.len()];
    for row in &l_rows {
        for (col_idx, (_, kind)) in l_columns.iter().enumerate() {
            let value = derive_any_value_from_row(row, col_idx, *kind)
                .map_err(|err| derive_query_error(view_name, err))?;
            l_values_by_col[col_idx].push(value);
        }
    }

    let l_names: Vec<String> = l_columns.into_iter().map(|(name, _)| name).collect();
    build_frame(&l_names, l_values_by_col).map_err(|source| ReportError::Frame {
        view: view_name.to_string(),
        source,
    })
}

fn derive_query_error(view_name: &str, source: sqlx::Error) -> ReportError {
    ReportError::Query {
        view: view_name.to_string(),
        source,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueDecoding

fn derive_any_value_from_row(
    row: &MySqlRow,
    col_idx: usize,
    kind: EnumMySqlKind,
) -> Result<AnyValue<'static>, sqlx::Error> {
    let value = match kind {
        EnumMySqlKind::Null => None,
        EnumMySqlKind::Boolean => row.try_get::<Option<bool>, _>(col_idx)?.map(AnyValue::Boolean),
        EnumMySqlKind::Int => row.try_get::<Option<i64>, _>(col_idx)?.map(AnyValue::Int64),
        EnumMySqlKind::UInt => row.try_get::<Option<u64>, _>(col_idx)?.map(AnyValue::UInt64),
        // Through the shortest decimal text so 0.1f32 stays 0.1.
        EnumMySqlKind::Float => row
            .try_get::<Option<f32>, _>(col_idx)?
            .map(|val| AnyValue::Float64(val.to_string().parse().unwrap_or(f64::from(val)))),
        EnumMySqlKind::Double => row.try_get::<Option<f64>, _>(col_idx)?.map(AnyValue::Float64),
        EnumMySqlKind::Decimal => row
            .try_get::<Option<Decimal>, _>(col_idx)?
            .map(derive_any_value_from_decimal),
        EnumMySqlKind::Date => row
            .try_get::<Option<NaiveDate>, _>(col_idx)?
            .map(|val| derive_text_value(val.format("%Y-%m-%d").to_string())),
        EnumMySqlKind::DateTime => row
            .try_get::<Option<NaiveDateTime>, _>(col_idx)?
            .map(|val| derive_text_value(val.format("%Y-%m-%d %H:%M:%S").to_string())),
        EnumMySqlKind::Time => row
            .try_get::<Option<NaiveTime>, _>(col_idx)?
            .map(|val| derive_text_value(val.format("%H:%M:%S").to_string())),
        EnumMySqlKind::Text => match row.try_get::<Option<String>, _>(col_idx) {
            Ok(val) => val.map(derive_text_value),
            Err(_) => row
                .try_get::<Option<Vec<u8>>, _>(col_idx)?
                .map(|bytes| derive_text_value(String::from_utf8_lossy(&bytes).into_owned())),
        },
    };
    Ok(value.unwrap_or(AnyValue::Null))
}

fn derive_any_value_from_decimal(val: Decimal) -> AnyValue<'static> {
    match val.to_f64() {
        Some(n_val) => AnyValue::Float64(n_val),
        None => derive_text_value(val.to_string()),
    }
}

fn derive_text_value(val: String) -> AnyValue<'static> {
    AnyValue::StringOwned(val.into())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FrameAssembly

/// Assemble a DataFrame from column names and column-major values.
///
/// Each column's dtype is inferred from its values; an empty column is
/// typed `Null`.
pub fn build_frame(
    l_names: &[String],
    l_values_by_col: Vec<Vec<AnyValue<'static>>>,
) -> PolarsResult<DataFrame> {
    let l_columns = l_names
        .iter()
        .zip(l_values_by_col)
        .map(|(name, l_values)| {
            if l_values.is_empty() {
                return Ok(Column::from(Series::new_empty(
                    name.as_str().into(),
                    &DataType::Null,
                )));
            }
            Series::from_any_values(name.as_str().into(), &l_values, false).map(Column::from)
        })
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(l_columns)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_map_to_value_kinds() {
        assert_eq!(EnumMySqlKind::from_type_name("BIGINT"), EnumMySqlKind::Int);
        assert_eq!(
            EnumMySqlKind::from_type_name("INT UNSIGNED"),
            EnumMySqlKind::UInt
        );
        assert_eq!(
            EnumMySqlKind::from_type_name("DECIMAL"),
            EnumMySqlKind::Decimal
        );
        assert_eq!(
            EnumMySqlKind::from_type_name("TIMESTAMP"),
            EnumMySqlKind::DateTime
        );
        assert_eq!(
            EnumMySqlKind::from_type_name("BOOLEAN"),
            EnumMySqlKind::Boolean
        );
        assert_eq!(EnumMySqlKind::from_type_name("VARCHAR"), EnumMySqlKind::Text);
        assert_eq!(EnumMySqlKind::from_type_name("JSON"), EnumMySqlKind::Text);
    }

    #[test]
    fn test_decimal_becomes_float() {
        let val = Decimal::new(12345, 2);
        match derive_any_value_from_decimal(val) {
            AnyValue::Float64(n_val) => assert!((n_val - 123.45).abs() < 1e-9),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_build_frame_keeps_column_order_and_nulls() {
        let l_names = vec!["nome_projeto".to_string(), "horas".to_string()];
        let df = build_frame(
            &l_names,
            vec![
                vec![derive_text_value("Alpha".to_string()), AnyValue::Null],
                vec![AnyValue::Float64(1.5), AnyValue::Float64(2.0)],
            ],
        )
        .unwrap();

        assert_eq!(df.get_column_names_str(), vec!["nome_projeto", "horas"]);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("nome_projeto").unwrap().null_count(), 1);
        assert_eq!(df.column("horas").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_build_frame_without_rows_keeps_headers() {
        let l_names = vec!["mes".to_string(), "total".to_string()];
        let df = build_frame(&l_names, vec![Vec::new(), Vec::new()]).unwrap();

        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
        assert_eq!(df.get_column_names_str(), vec!["mes", "total"]);
    }
}
