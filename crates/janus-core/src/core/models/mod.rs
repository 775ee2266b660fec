pub mod areas;
pub mod grid;
pub mod interaction;
