//! crowtalk - Offline field companion for corvid vocalizations
//!
//! crowtalk keeps a catalog of crow and jackdaw sounds (synthetic demos,
//! curated library clips, and the user's own field recordings), logs
//! playback/response sessions, and suggests what to play next based on a
//! per-category communication guide.
//!
//! # Architecture
//!
//! - [`registry`] - Category definitions and their guide rule tables
//! - [`catalog`] - Unified catalog assembly with tier precedence and
//!   distance sorting
//! - [`suggest`] - Response-driven suggestion engine with repetition
//!   avoidance
//! - [`session`] - In-memory session event log
//! - [`storage`] - `SQLite`-backed persistence for recordings and events
//! - [`export`] - JSON export bundle with a frozen key schema
//! - [`geo`] - Great-circle distance
//! - [`config`] - Configuration loading and validation
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```
//! use crowtalk::catalog::{synthetic_demos, CatalogBuilder};
//! use crowtalk::registry::CategoryRegistry;
//!
//! let registry = CategoryRegistry::builtin();
//! let builder = CatalogBuilder::new(&registry);
//! let catalog = builder
//!     .build(synthetic_demos(), vec![], vec![], None)
//!     .unwrap();
//! assert!(!catalog.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod geo;
pub mod logging;
pub mod model;
pub mod registry;
pub mod session;
pub mod storage;
pub mod suggest;

pub use catalog::CatalogBuilder;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use registry::CategoryRegistry;
pub use session::SessionLog;
pub use storage::Storage;
pub use suggest::SuggestionEngine;
