pub mod actor;
pub mod grid;
pub mod return_point;
pub mod rules;
pub mod tile;
