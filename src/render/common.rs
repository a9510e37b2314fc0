//! Shared helpers for markup templates.

use super::MarkupDocument;
use crate::imaging::EmbeddableImage;

/// Escape special characters for Typst string contexts. Every interpolated
/// value in the templates goes through a string literal, never raw content.
pub fn escape_markup(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

/// Markup for an image slot: embeds the image as a named attachment, or
/// renders a labeled outline box when the image is missing or unreadable.
pub fn embed_or_placeholder(
    document: &mut MarkupDocument,
    image: Option<&EmbeddableImage>,
    name: &str,
    width_pt: u32,
    height_pt: u32,
    label: &str,
) -> String {
    if let Some(image) = image {
        if let Ok(bytes) = image.bytes() {
            let file = format!("{name}.{}", image.extension());
            document.attach(file.clone(), bytes);
            return format!(
                r#"#image("{file}", width: {width_pt}pt, height: {height_pt}pt, fit: "contain")"#
            );
        }
    }
    format!(
        "#rect(width: {width_pt}pt, height: {height_pt}pt, stroke: 0.5pt + gray)[#align(center + horizon)[#text(size: 8pt, fill: gray)[{}]]]",
        escape_markup(label)
    )
}
