//! Text rendering of boards, turns and game results.

mod ascii;
mod summary;

pub use ascii::render_world;
pub use summary::{render_state, render_summary, render_turn};
