mod list;
mod mirrors;
mod reader;

pub use list::ListSpec;
pub use mirrors::MirrorPool;
pub use reader::SocialReader;
