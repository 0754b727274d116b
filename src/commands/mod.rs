pub mod build;
pub mod show;

pub use crate::utils::tui::create_spinner;
