//! `timesync_report` v1:
//! Timesync monthly report export, as a one-shot script and as an HTTP service.
//!
//! Module layout:
//! - `conf`      : environment keys, defaults and the fixed view catalog
//! - `spec`      : configuration structs, fetched data and errors
//! - `connector` : connection retry loop
//! - `source`    : view queries into DataFrames
//! - `builder`   : fetch, render and serialize orchestration
//! - `delivery`  : script mode and HTTP service
//! - `log`       : tracing bootstrap
pub mod builder;
pub mod conf;
pub mod connector;
pub mod delivery;
pub mod log;
pub mod source;
pub mod spec;

pub use builder::{
    build_report_bytes, build_report_file, fetch_report_data, fetch_then_close,
    render_report_bytes, render_report_workbook, spawn_render_report_bytes,
};
pub use conf::EnumReportView;
pub use connector::{connect_with_retry, run_with_retry};
pub use delivery::{create_report_router, run_export, serve};
pub use source::{fetch_report_views, fetch_view};
pub use spec::{
    ReportError, SpecDbConfig, SpecReportContext, SpecReportData, SpecRetryExhausted,
    SpecRetryPolicy,
};
