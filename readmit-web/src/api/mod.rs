//! HTTP API handlers for readmit-web

pub mod assess;
pub mod buildinfo;
pub mod health;
pub mod options;
pub mod ui;

pub use assess::{assess, assess_batch};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use options::get_form_options;
pub use ui::{serve_app_js, serve_index};
