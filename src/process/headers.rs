/// Clean a raw column or field name: strip leading/trailing whitespace and
/// collapse embedded newlines (with any whitespace around them) to a single
/// space.
///
/// Applied uniformly to raw-table columns and metadata keys before any
/// lookup, so `"WE Active Material\nMass (mg)"` and
/// `"WE Active Material Mass (mg)"` resolve to the same name. Idempotent.
pub fn clean_header(raw: &str) -> String {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
