//! Task list extraction from markdown checkboxes.

use once_cell::sync::Lazy;
use regex::Regex;

/// `- [ ] text`, `* [x] text`, `+ [X] text` (one per line).
static CHECKBOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*[-*+]\s*\[([ xX])\]\s*(.+)$").expect("checkbox pattern is valid")
});

/// Extract task descriptions from markdown checkboxes.
///
/// Only unchecked boxes are returned unless `include_checked` is set.
/// Duplicates are dropped, first occurrence wins.
pub fn extract_tasks(markdown: &str, include_checked: bool) -> Vec<String> {
    let mut tasks: Vec<String> = Vec::new();
    for caps in CHECKBOX_RE.captures_iter(markdown) {
        let checked = !caps[1].trim().is_empty();
        if checked && !include_checked {
            continue;
        }
        let task = caps[2].trim().to_string();
        if !task.is_empty() && !tasks.contains(&task) {
            tasks.push(task);
        }
    }
    tasks
}
