//! Document identity for repository filenames.
//!
//! Filenames in the watched repository embed a four-part symbol `a.b.c.d`:
//! the first two numbers say *which* document it is, the last two say *which
//! revision*. This crate turns a filename into a [`Document`]
//! (normalized title, [`DocumentId`], [`Version`]) and defines how documents
//! relate to each other:
//!
//! - [`Document::same_document`]: same title and id, any version,
//! - `==`: same document and same version,
//! - [`Document::is_directly_followed_by`]: one revision step apart,
//! - [`Document::precedes`]: equal, earlier, or the direct predecessor.

mod compare;
mod consts;
pub mod error;
mod identity;
pub mod models;

pub use crate::identity::identify;
pub use crate::models::{Document, DocumentId, Symbol, Version};
