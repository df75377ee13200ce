pub mod export;
pub mod table;

pub use export::{export_file_name, to_csv, to_json, to_tsv, to_zip_bundle};
pub use table::{render_key_values, render_table};
