//! UI layer for desktop GUI: app shell and page panels.

pub mod app;
pub mod panels;

pub use app::TravellerApp;
