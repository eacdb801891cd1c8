//! Plain-text bullet list format shared by the worksheet tools.
//!
//! Layout: one header line (e.g. `So What?`) followed by `- <label>` lines in
//! display order. Parsing is forgiving: blank lines are skipped, the header
//! is dropped wherever it appears, and a missing dash still yields the line.

/// Header used by the hypothesis-generation source list.
pub const SO_WHAT_HEADER: &str = "So What?";

/// Parse a bullet list, returning labels in file order.
pub fn parse(text: &str, header: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| *line != header)
        .filter_map(|line| {
            let label = line.strip_prefix('-').unwrap_or(line).trim();
            if label.is_empty() {
                None
            } else {
                Some(label.to_string())
            }
        })
        .collect()
}

/// Render a bullet list. Items are trimmed and blank entries dropped; a
/// trailing newline is emitted only when at least one item survives.
pub fn render(items: &[String], header: &str) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    let mut out = String::from(header);
    out.push('\n');
    out.push_str(
        &items
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    if !items.is_empty() {
        out.push('\n');
    }
    out
}

/// Append one bullet to existing content, or start a fresh list when the
/// file did not exist yet.
pub fn append(existing: Option<&str>, label: &str, header: &str) -> String {
    let line = format!("\n- {label}");
    match existing {
        Some(content) => format!("{content}{line}"),
        None => format!("{header}{line}"),
    }
}
