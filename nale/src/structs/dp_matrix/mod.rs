pub mod flat;

pub use flat::DpMatrixFlat;
