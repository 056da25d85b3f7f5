// Sales Registry - Core Library
// Forms, validation and persistence for departments and sellers.
// The binary (CLI + terminal UI) is a thin layer on top.

pub mod config;
pub mod db;
pub mod entities;
pub mod form;
pub mod logging;
pub mod notifier;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use config::{Cli, Command, Config, RecordKind};
pub use db::{setup_database, SqliteStore, Table};
pub use entities::{Department, Seller};
pub use form::{
    CloseRequest, DepartmentForm, EntityForm, FieldKind, FormBinding, FormError, FormFields,
    SaveOutcome, SellerForm, TextField,
};
pub use notifier::{ChangeListener, ChangeNotifier};
pub use service::{PersistenceError, PersistenceService};
pub use validation::{ParsePolicy, ValidationErrors};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
