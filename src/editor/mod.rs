pub mod buffer;
pub mod cursor;
pub mod edit;

pub use buffer::TextBuffer;
pub use cursor::CursorOps;
pub use edit::{Edit, EditOps};
