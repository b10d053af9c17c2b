//! # wskit
//!
//! WebSphere JDBC provider declarations and a wsadmin-backed executor.
//!
//! This crate provides:
//! - Field validators and an explicit attribute schema
//! - [`JdbcProvider`], the validated declaration of one provider
//! - [`declare::Batch`], which builds a run's declarations and rejects
//!   duplicate names
//! - [`wsadmin::WsadminExecutor`], an [`declarative::Executor`] that drives
//!   `wsadmin.sh` with generated Jython scripts
//!
//! ## Example
//!
//! ```
//! use declarative::{Ensure, Resource};
//! use wskit::{Attributes, JdbcProvider};
//!
//! let mut attrs = Attributes::new();
//! attrs.insert("dmgr_profile".into(), "Dmgr01".into());
//! attrs.insert("profile_base".into(), "/opt/IBM/WebSphere/AppServer/profiles".into());
//! attrs.insert("cell".into(), "CELL01".into());
//!
//! let provider = JdbcProvider::build("oracleJDBC", &attrs).unwrap();
//! assert_eq!(provider.id(), "oracleJDBC");
//! assert_eq!(provider.ensure(), Ensure::Present);
//! assert_eq!(provider.user, "root");
//! ```

pub mod declare;
pub mod error;
pub mod record;
pub mod schema;
pub mod validate;
pub mod wsadmin;

pub use declare::{Batch, Declaration, Rejected};
pub use error::{DeclarationError, Error, ErrorCategory, Result, ValidationError};
pub use record::{Attributes, JdbcProvider, RESOURCE_TYPE, Sensitive};
pub use schema::{AttributeSchema, ResourceSchema, Rule, SchemaRegistry};
pub use wsadmin::{RetryConfig, RunAs, WsadminExecutor};

/// Registry with every resource type this crate can build
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new().with(JdbcProvider::schema())
}
