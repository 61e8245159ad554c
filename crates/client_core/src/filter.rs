/// Item options whose text starts with `group`, ignoring case.
///
/// An empty group yields no options, so a group has to be picked before an
/// item. Order follows `all_items`.
pub fn filter_items(all_items: &[String], group: &str) -> Vec<String> {
    if group.is_empty() {
        return Vec::new();
    }
    let prefix = group.to_lowercase();
    all_items
        .iter()
        .filter(|item| item.to_lowercase().starts_with(&prefix))
        .cloned()
        .collect()
}
