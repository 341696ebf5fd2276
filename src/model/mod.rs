mod common;
mod map_result;
mod match_summary;
mod player;
mod series;

pub use common::*;
pub use map_result::*;
pub use match_summary::*;
pub use player::*;
pub use series::*;
