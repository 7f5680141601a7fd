pub mod command;
pub mod draw;
pub mod event;
pub mod level;
pub mod loader;
pub mod session;
