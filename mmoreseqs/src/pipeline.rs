mod align;
mod prep;
mod search;
mod seed;
mod threaded_align;

pub use align::align;
pub use prep::prep;
pub use search::search;
pub use seed::{seed, SeedMap};
