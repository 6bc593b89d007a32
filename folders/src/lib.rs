//! Collection (folder) membership for repository objects.

mod encode;
mod info;

pub use encode::{decode_for_display, encode};
pub use info::{FolderInfo, FolderRef};
