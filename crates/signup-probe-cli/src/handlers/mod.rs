//! Command handlers, kept out of main.rs so they can be tested

pub mod config;
pub mod list;

pub use config::{execute_config, render_config};
pub use list::{execute_list, render_case_list};
pub use test::{build_projects, execute_test, LaunchedProjects};
