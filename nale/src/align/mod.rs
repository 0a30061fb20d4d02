pub mod bounded;
pub mod needleman_wunsch;
pub mod quad;

pub use needleman_wunsch::{needleman_wunsch, SimpleTraceStep};
