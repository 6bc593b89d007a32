use serde::Serialize;
use std::fmt;

/// One of the four permission categories of the rights model.
///
/// Categories are independent: holding `Editor` or `Owner` grants nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Can find the object in search and browse
    Discoverer,
    /// Can view the object's content
    Reader,
    /// Can modify metadata and content
    Editor,
    /// Full control
    Owner,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Discoverer,
        Category::Reader,
        Category::Editor,
        Category::Owner,
    ];

    /// Value of the `type` attribute of this category's `<access>` block.
    pub fn access_type(&self) -> &'static str {
        match self {
            Category::Discoverer => "discover",
            Category::Reader => "read",
            Category::Editor => "edit",
            Category::Owner => "delete",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Discoverer => "discoverer",
            Category::Reader => "reader",
            Category::Editor => "editor",
            Category::Owner => "owner",
        };
        f.write_str(name)
    }
}
