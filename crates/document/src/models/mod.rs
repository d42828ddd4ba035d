mod document;
mod id;
mod symbol;
mod version;

pub use self::document::Document;
pub use self::id::DocumentId;
pub use self::symbol::Symbol;
pub use self::version::Version;
