//! Plain-text rendering of entries and pages for terminal output.

use std::fmt::Write;

use lexis_engine::lexis_core::{DictionaryEntry, Property, ReferenceTarget};
use lexis_engine::lexis_session::Page;
use unicode_width::UnicodeWidthStr;

/// Pad `s` with spaces to `width` terminal columns.
pub fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    let mut out = s.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(w)));
    out
}

/// Widest string in `items`, in terminal columns.
pub fn column_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
    items
        .into_iter()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

pub fn format_property(property: &Property) -> String {
    match property {
        Property::Plain(text) | Property::Simple(text) => text.clone(),
        Property::Morphology(forms) => forms.join(", "),
        Property::Audio { name, resource } => format!("{name} [{resource}]"),
        Property::Example { name, content } => format!("{name}: {content}"),
        Property::Url { name, url } => format!("{name} <{url}>"),
        Property::Wordnet { name, reference } => format!("{name} ({reference})"),
        Property::Reference { name, target } => match target {
            ReferenceTarget::Resolved(entry) => {
                format!("{name} → {} ({})", entry.representation, entry.id)
            }
            ReferenceTarget::Pending(id) => format!("{name} → {id}"),
        },
    }
}

/// Headword line followed by one indented block per property group.
pub fn format_entry(entry: &DictionaryEntry) -> String {
    let mut out = String::new();
    let mark = if entry.is_bookmarked() { " *" } else { "" };
    let _ = writeln!(out, "{} ({}){mark}", entry.representation, entry.id);
    if let Some(base) = &entry.base {
        let _ = writeln!(out, "  base: {} ({})", base.representation, base.id);
    } else if let Some(base_id) = &entry.base_id {
        let _ = writeln!(out, "  base: {base_id} (missing)");
    }
    for group in &entry.properties {
        let _ = writeln!(out, "  {}", group.category.name);
        for property in &group.properties {
            let _ = writeln!(out, "    {}", format_property(property));
        }
    }
    out
}

/// One row per entry (form, id, first property) and a key footer.
pub fn format_page(page: &Page) -> String {
    let mut out = String::new();
    let form_width = column_width(page.items.iter().map(|e| e.representation.as_str()));
    let id_width = column_width(page.items.iter().map(|e| e.id.as_str()));
    for entry in &page.items {
        let summary = entry
            .properties
            .first()
            .and_then(|g| g.properties.first())
            .map(format_property)
            .unwrap_or_default();
        let line = format!(
            "{}  {}  {summary}",
            pad(&entry.representation, form_width),
            pad(&entry.id, id_width)
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let key = |k: Option<i64>| k.map_or_else(|| "-".to_string(), |k| k.to_string());
    let _ = writeln!(
        out,
        "--- {} items, prev={}, next={}",
        page.items.len(),
        key(page.prev_key),
        key(page.next_key)
    );
    out
}
