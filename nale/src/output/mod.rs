pub mod output_tabular;

pub use output_tabular::{write_alignment, write_header};
