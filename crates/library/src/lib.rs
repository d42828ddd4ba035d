//! The watching itself: index the secondary store, run a pass, decide when
//! to run the next one.

pub mod error;
mod index;
mod run;
mod schedule;

pub use crate::index::{SecondaryEntry, SecondaryIndex};
pub use crate::run::{Context, Envelope, Outcome, run};
pub use crate::schedule::{Schedule, Window};
