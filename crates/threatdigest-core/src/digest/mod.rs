mod format;
mod record;
mod store;

pub use format::{render, render_markdown};
pub use record::{DigestEntry, DigestRecord};
pub use store::DigestStore;
