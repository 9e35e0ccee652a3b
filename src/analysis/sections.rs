//! Parsing of `###`-delimited analysis text

use crate::common::types::AnalysisSections;

/// Bucket for text that precedes the first heading
pub const OVERVIEW: &str = "overview";

/// Normalize a heading into a section key: `"SWOT Analysis"` -> `"swot_analysis"`
pub fn section_key(heading: &str) -> String {
    heading
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn heading_of(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix("###").map(str::trim)
}

fn flush(name: &str, lines: &mut Vec<&str>, sections: &mut AnalysisSections) {
    let text = lines.join("\n").trim().to_string();
    if !text.is_empty() {
        sections.insert(name.to_string(), text);
    }
    lines.clear();
}

/// Split analysis text on `### Heading` lines
///
/// Text before the first heading lands under [`OVERVIEW`]. Empty sections
/// are omitted; a repeated heading keeps its last body.
pub fn parse_sections(content: &str) -> AnalysisSections {
    let mut sections = AnalysisSections::new();
    let mut current = OVERVIEW.to_string();
    let mut body: Vec<&str> = Vec::new();

    for line in content.lines() {
        match heading_of(line) {
            Some(heading) if !heading.is_empty() => {
                flush(&current, &mut body, &mut sections);
                current = section_key(heading);
            }
            _ => body.push(line),
        }
    }
    flush(&current, &mut body, &mut sections);

    sections
}

/// Items of a list-shaped section, one per non-empty line
///
/// Leading bullet (`-`, `*`, `•`) or enumeration (`1.`, `2)`) markers are removed.
pub fn list_items(section: &str) -> Vec<String> {
    section
        .lines()
        .map(strip_marker)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix('•'))
    {
        return rest.trim();
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            // `1.5x growth` is content, not a marker
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    line
}
