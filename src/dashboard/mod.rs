//! Dashboard views.
//!
//! Selection of the queries behind each view, plus the interactive command
//! syntax used to switch between views.

pub mod command;
pub mod selector;

pub use command::{parse_command, Command};
pub use selector::{build_view, DashboardView, Panel, View, ViewSettings};
