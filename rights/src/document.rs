use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::{error::Result, Category, Identity};

const RIGHTS_NAMESPACE: &str = "http://hydra-collab.stanford.edu/schemas/rightsMetadata/v1";
const RIGHTS_VERSION: &str = "0.1";

/// Who may discover, read, edit or own an object.
///
/// Built once per form submission by [crate::build] and not modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RightsDocument {
    discover: BTreeSet<Identity>,
    read: BTreeSet<Identity>,
    edit: BTreeSet<Identity>,
    own: BTreeSet<Identity>,
}

impl RightsDocument {
    pub(crate) fn new(
        discover: BTreeSet<Identity>,
        read: BTreeSet<Identity>,
        edit: BTreeSet<Identity>,
        own: BTreeSet<Identity>,
    ) -> Self {
        Self {
            discover,
            read,
            edit,
            own,
        }
    }

    pub fn identities(&self, category: Category) -> &BTreeSet<Identity> {
        match category {
            Category::Discoverer => &self.discover,
            Category::Reader => &self.read,
            Category::Editor => &self.edit,
            Category::Owner => &self.own,
        }
    }

    pub fn contains(&self, category: Category, token: &str) -> bool {
        self.identities(category)
            .iter()
            .any(|identity| identity.as_str() == token)
    }

    /// Categories held by `token`, in [Category::ALL] order.
    pub fn categories_of(&self, token: &str) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.contains(*category, token))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.identities(*category).is_empty())
    }

    /// Renders the document as `rightsMetadata` XML.
    ///
    /// Every category gets an `<access>` block, even when empty, so the storage API
    /// replaces the previous grants rather than merging with them.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("rightsMetadata");
        root.push_attribute(("xmlns", RIGHTS_NAMESPACE));
        root.push_attribute(("version", RIGHTS_VERSION));
        writer.write_event(Event::Start(root))?;

        for category in Category::ALL {
            let mut access = BytesStart::new("access");
            access.push_attribute(("type", category.access_type()));
            writer.write_event(Event::Start(access))?;
            writer.write_event(Event::Start(BytesStart::new("machine")))?;

            for identity in self.identities(category) {
                writer.write_event(Event::Start(BytesStart::new("group")))?;
                writer.write_event(Event::Text(BytesText::new(identity.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new("group")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("machine")))?;
            writer.write_event(Event::End(BytesEnd::new("access")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rightsMetadata")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build, RightsInputs};

    fn ids(tokens: &[&str]) -> Vec<Identity> {
        tokens.iter().map(|t| Identity::new(*t).unwrap()).collect()
    }

    #[test]
    fn test_xml_has_one_block_per_category() {
        let xml = build(&RightsInputs {
            discover_and_read: ids(&["BDR_PUBLIC"]),
            owners: ids(&["BROWN:DEPARTMENT:LIBRARY:REPOSITORY"]),
            ..Default::default()
        })
        .to_xml()
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        for access_type in ["discover", "read", "edit", "delete"] {
            assert_eq!(
                xml.matches(&format!("<access type=\"{access_type}\">"))
                    .count(),
                1,
                "{xml}"
            );
        }
        assert_eq!(xml.matches("<group>BDR_PUBLIC</group>").count(), 2);
        assert_eq!(
            xml.matches("<group>BROWN:DEPARTMENT:LIBRARY:REPOSITORY</group>")
                .count(),
            1
        );
    }

    #[test]
    fn test_xml_groups_are_listed_in_their_block() {
        let xml = build(&RightsInputs {
            edit_rights: ids(&["EDITORS"]),
            ..Default::default()
        })
        .to_xml()
        .unwrap();

        let edit_start = xml.find("<access type=\"edit\">").unwrap();
        let delete_start = xml.find("<access type=\"delete\">").unwrap();
        let group = xml.find("<group>EDITORS</group>").unwrap();
        assert!(edit_start < group && group < delete_start);
    }

    #[test]
    fn test_xml_escapes_identities() {
        let xml = build(&RightsInputs {
            read_only: ids(&["R&D <lab>"]),
            ..Default::default()
        })
        .to_xml()
        .unwrap();

        assert!(xml.contains("<group>R&amp;D &lt;lab&gt;</group>"), "{xml}");
    }

    #[test]
    fn test_document_serializes_categories_as_sets() {
        let doc = build(&RightsInputs {
            discover_and_read: ids(&["B", "A", "B"]),
            ..Default::default()
        });

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({
                "discover": ["A", "B"],
                "read": ["A", "B"],
                "edit": [],
                "own": [],
            })
        );
    }
}
