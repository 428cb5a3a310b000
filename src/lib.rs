mod cursor_list;
mod errors;
mod key;
mod node;
mod traits;

pub use cursor_list::{CursorList, Iter};
pub use errors::CursorListError;
pub use traits::{List, ListCursor};
