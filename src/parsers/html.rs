use scraper::{ElementRef, Html, Node};

/// Elements dropped together with everything inside them.
///
/// `noscript` and `iframe` only hold fallback or embedded documents on
/// listing pages and are dropped along with the other non-content tags.
pub const REMOVED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "svg", "head", "img", "noscript", "iframe",
];

/// Attributes stripped from every element that survives cleaning
pub const REMOVED_ATTRIBUTES: &[&str] = &["class", "id"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const INDENT: &str = "  ";

/// Nesting deeper than this is written at the same indentation
pub const MAX_INDENT_DEPTH: usize = 32;

/// A listing page with the non-content markup removed
#[derive(Debug)]
pub struct CleanedPage {
    /// Indented HTML, suitable for writing to a snapshot file
    pub html: String,
    /// The same markup parsed back for querying
    pub document: Html,
}

/// Strips non-content elements and `class`/`id` attributes from a page.
///
/// Parsing is permissive, so any input produces a page; markup that is
/// already missing is simply not removed.
pub fn clean(raw: &str) -> CleanedPage {
    let doc = Html::parse_document(raw);

    let mut html = String::from("<!DOCTYPE html>\n");
    write_element(doc.root_element(), 0, &mut html);

    let document = Html::parse_document(&html);
    ::log::trace!("Cleaned page down to {} bytes", html.len());

    CleanedPage { html, document }
}

fn write_element(element: ElementRef<'_>, depth: usize, out: &mut String) {
    let el = element.value();
    let name = el.name();
    if REMOVED_TAGS.contains(&name) {
        return;
    }

    push_indent(out, depth);
    out.push('<');
    out.push_str(name);
    for (attr, value) in el.attrs() {
        if REMOVED_ATTRIBUTES.contains(&attr) {
            continue;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push_str(">\n");

    if VOID_TAGS.contains(&name) {
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            write_element(child_element, depth + 1, out);
            continue;
        }
        if let Node::Text(text) = child.value() {
            let text = text.trim();
            if !text.is_empty() {
                push_indent(out, depth + 1);
                out.push_str(&escape_text(text));
                out.push('\n');
            }
        }
    }

    push_indent(out, depth);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth.min(MAX_INDENT_DEPTH) {
        out.push_str(INDENT);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
