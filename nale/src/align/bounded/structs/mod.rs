pub mod bound;
pub mod cloud_bound_group;
pub mod cloud_matrix;
pub mod edgebound_rows;
pub mod params;
pub mod seed;
pub mod sparse_matrix;
pub mod special_matrix;

pub use bound::{Bound, Edgebounds, Mode};
pub use cloud_bound_group::{CloudBoundGroup, RowBounds};
pub use cloud_matrix::CloudMatrixLinear;
pub use edgebound_rows::{EdgeboundRows, MAX_BOUNDS_PER_ROW};
pub use params::CloudSearchParams;
pub use seed::Seed;
pub use sparse_matrix::DpMatrixSparse;
pub use special_matrix::SpecialMatrix;
