use crate::models::Objective;

/// Case-insensitive substring search over the rendered view. Filtering never
/// touches the stored list; the total count shown in the UI always reflects
/// the unfiltered list.
pub fn filter_objectives<'a>(objectives: &'a [Objective], query: &str) -> Vec<&'a Objective> {
    objectives
        .iter()
        .filter(|objective| matches_query(objective, query))
        .collect()
}

/// An objective matches when the query is a substring of its text, its
/// priority label, or any of its tags. A leading `#` on the query is
/// stripped for tag matching only, so `#work` finds the tag `work` without
/// requiring the text to contain a `#`.
pub fn matches_query(objective: &Objective, query: &str) -> bool {
    // No trimming: a whitespace query substring-matches like any other.
    let query = query.to_lowercase();
    if query.is_empty() {
        return true;
    }
    let tag_query = query.strip_prefix('#').unwrap_or(&query);

    objective.text.to_lowercase().contains(&query)
        || objective.priority.label().contains(&query)
        || objective
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(tag_query))
}
