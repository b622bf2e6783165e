pub mod config;
pub mod error;
pub mod output_formats;
pub mod patterns;
pub mod report;
pub mod selector;
pub mod source;

pub use config::{Config, FiltersConfig, OutputConfig, ReadConfig, StyleConfig};
pub use error::{AppError, Result};
pub use output_formats::{DefaultPatterns, default_patterns};
pub use patterns::{Pattern, PatternSet, compile_patterns};
pub use report::{ReportDocument, ReportSummary, write_report};
pub use selector::{SelectedFile, Selection, SelectionPolicy, gather_files, select_files};
pub use source::{ReadErrorPolicy, SourceFile, read_source};
