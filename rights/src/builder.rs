use std::collections::BTreeSet;

use crate::{Category, Identity, RightsDocument};

/// Identity selections from the rights edit form.
///
/// Each field must already be a clean list of tokens. Splitting delimited text
/// and dropping blank entries happens before the inputs reach [build].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RightsInputs {
    pub discover_and_read: Vec<Identity>,
    pub discover_only: Vec<Identity>,
    pub read_only: Vec<Identity>,
    pub edit_rights: Vec<Identity>,
    pub owners: Vec<Identity>,
}

impl RightsInputs {
    /// Each input field paired with the categories it grants.
    fn grants(&self) -> [(&[Category], &[Identity]); 5] {
        [
            (
                &[Category::Reader, Category::Discoverer],
                &self.discover_and_read,
            ),
            (&[Category::Reader], &self.read_only),
            (&[Category::Discoverer], &self.discover_only),
            (&[Category::Editor], &self.edit_rights),
            (&[Category::Owner], &self.owners),
        ]
    }

    fn members_of(&self, category: Category) -> BTreeSet<Identity> {
        self.grants()
            .into_iter()
            .filter(|(categories, _)| categories.contains(&category))
            .flat_map(|(_, identities)| identities.iter().cloned())
            .collect()
    }
}

/// Builds the rights document for a set of form selections.
///
/// A token listed in several fields holds the union of their categories. No
/// category implies another, so an editor who should also see the object must be
/// listed under a read field as well.
pub fn build(inputs: &RightsInputs) -> RightsDocument {
    RightsDocument::new(
        inputs.members_of(Category::Discoverer),
        inputs.members_of(Category::Reader),
        inputs.members_of(Category::Editor),
        inputs.members_of(Category::Owner),
    )
}
