//! Rights metadata for repository objects.
//!
//! Staff select identities for five rights fields on an edit form. [build] turns
//! those selections into a [RightsDocument] with four independent permission
//! categories, and [RightsDocument::to_xml] renders it for the storage API.

mod builder;
mod category;
mod document;
mod error;
mod identity;

pub use builder::{build, RightsInputs};
pub use category::Category;
pub use document::RightsDocument;
pub use error::{Error, Result};
pub use identity::Identity;
