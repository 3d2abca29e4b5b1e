//! # chiffrage-db: Database Layer
//!
//! Persistence and the reactive recompute protocol for the estimation
//! system. SQLite via sqlx, embedded migrations, one repository per
//! aggregate, and the [`SummaryEngine`] that keeps every project summary
//! consistent with its contributing entities.
//!
//! ## Data Flow
//! ```text
//! Collaborator mutation
//!      │  db.selections().insert(&selection)
//!      ▼
//! Repository ──► writes row, returns ProjectEvent
//!      │
//!      ▼
//! SummaryEngine::apply(&event)
//!      │  transactional read-then-write of the project's summary
//!      ▼
//! Summary row up to date before the caller continues
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - connection pool creation and configuration
//! - [`migrations`] - embedded database migrations
//! - [`error`] - database error types
//! - [`repository`] - repository implementations
//! - [`engine`] - the summary engine (aggregation + trigger consumer)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chiffrage_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./chiffrage.db")).await?;
//!
//! let (selection, event) = db
//!     .selections()
//!     .add_catalog_item(&project_id, &item_id, 250)
//!     .await?;
//! db.engine().apply(&event).await?;
//!
//! let summary = db.engine().get_or_create(&project_id).await?;
//! println!("total TTC: {}", summary.total_ttc());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_util;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::SummaryEngine;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::project::ProjectRepository;
pub use repository::reference::ReferenceRepository;
pub use repository::request::RequestRepository;
pub use repository::sandblast::SandblastRepository;
pub use repository::selection::SelectionRepository;
pub use repository::summary::SummaryRepository;
