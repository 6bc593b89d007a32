/// Encodes collection ids into the folder parameter string, `id#id+id#id`.
///
/// The storage API pairs a folder name with its id; the id is reused as the name.
/// Ids are trimmed and blank ones dropped. Order is preserved and an empty list
/// encodes to `""`.
pub fn encode<I, S>(identifiers: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    identifiers
        .into_iter()
        .filter_map(|id| {
            let id = id.as_ref().trim();
            (!id.is_empty()).then(|| format!("{id}#{id}"))
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// Joins a stored collection list for pre-populating the edit form, e.g. `"1, 2"`.
///
/// This is for display only and does not invert [encode].
pub fn decode_for_display<I, S>(stored: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    stored
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
