//! Terminal front end: one module per command plus shared table styling.

pub mod overview;
pub mod query;
pub mod setup;
pub mod trend;
pub mod ui;
