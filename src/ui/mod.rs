pub mod dashboard;
pub mod status;

pub use dashboard::{render_dashboard, Panels};
pub use status::{render_help_bar, render_status_bar, StatusLine};
