//! Concrete adapter implementations for ports.

pub mod console_report_adapter;
pub mod csv_adapter;
pub mod csv_table_adapter;
pub mod file_config_adapter;
