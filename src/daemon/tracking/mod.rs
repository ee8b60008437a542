pub mod state;
pub mod tracker;
