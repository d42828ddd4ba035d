//! Reporting changes: rendering the HTML report and delivering it.

pub mod error;
mod message;
mod notify;
mod render;
mod report;

pub use crate::message::Message;
pub use crate::notify::{Archive, DryRun, Notifier, Sendmail};
pub use crate::render::{BUILTIN_TEMPLATE, Reporter};
pub use crate::report::{ChangedFile, FolderChanges, Report};
