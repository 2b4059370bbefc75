//! Client core of the LUCT faculty reporting dashboards: typed access to the
//! reporting backend, per-role dashboard state and the write workflows.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod forms;
pub mod models;
pub mod routes;
pub mod session;
pub mod view;
pub mod workflow;

pub use client::ApiClient;
pub use config::{Config, Credentials};
pub use dashboard::{Dashboard, TabView};
pub use error::{ApiError, ConfigError, ExportError, SessionError};
pub use session::{CurrentUser, Session};
pub use view::{Access, Tab};
pub use workflow::{Outcome, Workflow};
