//! Comment-marker section merging
//!
//! Some rendered files (AGENTS.md and friends) own only a marked section of
//! a file the user also edits. Content wrapped in
//! `<!-- start: X --> ... <!-- end: X -->` replaces that section in the
//! existing file, or is appended when the section is not there yet.

/// Marker name from content wrapped in a start comment, if any
///
/// Scans every HTML comment: unrelated comments before the marker do not
/// hide it.
pub fn extract_comment_marker(content: &str) -> Option<String> {
    let mut rest = content;
    while let Some(start) = rest.find("<!--") {
        let after = &rest[start + 4..];
        let close = after.find("-->")?;
        let inner = after[..close].trim();
        if let Some(marker) = inner.strip_prefix("start:") {
            let marker = marker.trim();
            if !marker.is_empty() {
                return Some(marker.to_string());
            }
        }
        rest = &after[close + 3..];
    }
    None
}

/// Merge marked `new_content` into `existing`
pub fn merge_with_markers(existing: &str, new_content: &str, marker: &str) -> String {
    let start_marker = format!("<!-- start: {marker} -->");
    let end_marker = format!("<!-- end: {marker} -->");

    // Section body from the rendered content; fall back to the whole payload
    let section = section_between(new_content, &start_marker, &end_marker)
        .map_or_else(|| new_content.trim().to_string(), |body| body.trim().to_string());

    let replacement = format!("{start_marker}\n{section}\n{end_marker}");

    match span_between(existing, &start_marker, &end_marker) {
        Some((from, to)) => {
            let mut merged = String::with_capacity(existing.len() + replacement.len());
            merged.push_str(&existing[..from]);
            merged.push_str(&replacement);
            merged.push_str(&existing[to..]);
            merged
        }
        None => format!("{existing}\n{replacement}"),
    }
}

fn section_between<'a>(content: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let (from, to) = inner_span(content, start, end)?;
    Some(&content[from..to])
}

/// Byte span covering the whole marked section, markers included
fn span_between(content: &str, start: &str, end: &str) -> Option<(usize, usize)> {
    let start_at = content.find(start)?;
    let end_at = content[start_at..].find(end)? + start_at;
    Some((start_at, end_at + end.len()))
}

fn inner_span(content: &str, start: &str, end: &str) -> Option<(usize, usize)> {
    let start_at = content.find(start)? + start.len();
    let end_at = content[start_at..].find(end)? + start_at;
    Some((start_at, end_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_marker_name() {
        assert_eq!(
            extract_comment_marker("<!-- start: Packmind recipes -->\nbody"),
            Some("Packmind recipes".to_string())
        );
    }

    #[test]
    fn test_no_marker_in_plain_content() {
        assert_eq!(extract_comment_marker("# Just markdown"), None);
        assert_eq!(extract_comment_marker("<!-- a comment -->"), None);
    }

    #[test]
    fn test_marker_found_after_unrelated_comment() {
        let content = "<!-- License: MIT -->\n<!-- start: Packmind standards -->\nbody";
        assert_eq!(
            extract_comment_marker(content),
            Some("Packmind standards".to_string())
        );
    }

    #[test]
    fn test_replaces_existing_section() {
        let existing = "intro\n<!-- start: X -->\nold\n<!-- end: X -->\noutro";
        let update = "<!-- start: X -->\nnew\n<!-- end: X -->";
        let merged = merge_with_markers(existing, update, "X");

        assert_eq!(
            merged,
            "intro\n<!-- start: X -->\nnew\n<!-- end: X -->\noutro"
        );
    }

    #[test]
    fn test_appends_missing_section() {
        let merged = merge_with_markers(
            "user content",
            "<!-- start: X -->\nadded\n<!-- end: X -->",
            "X",
        );

        assert_eq!(
            merged,
            "user content\n<!-- start: X -->\nadded\n<!-- end: X -->"
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let update = "<!-- start: X -->\nbody\n<!-- end: X -->";
        let once = merge_with_markers("head", update, "X");
        let twice = merge_with_markers(&once, update, "X");
        assert_eq!(once, twice);
    }
}
