//! The dashboard screen: state machine, fetch execution and rendering.
//!
//! `Dashboard` is synchronous. Operations that need the network return a
//! [`FetchRequest`]; the caller runs it with [`execute`] (or [`spawn_fetch`]) and feeds
//! the [`FetchOutcome`] back through [`Dashboard::apply`]. Only the outcome of the most
//! recently issued request is applied.

pub mod controller;
pub mod error_mapping;
pub mod fetch;
pub mod render;
pub mod service;
pub mod state;

pub use controller::Dashboard;
pub use fetch::{execute, FetchKind, FetchOutcome, FetchRequest, Loaded, Services};
pub use render::{paint, render};
pub use service::{spawn_fetch, DashboardMessage};
pub use state::{DataSource, Tab, ViewStatus, PLACEHOLDER_LABEL};
