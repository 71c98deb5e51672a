pub mod export;
pub mod formatter;

pub use export::{export_csv, export_file_name};
pub use formatter::{
    format_breakdown, format_csv, format_percent, format_picks, format_prediction_table,
    format_tsv, should_use_colors, truncate_title, CSV_HEADER,
};
