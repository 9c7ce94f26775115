//! Bracket span resolution
//!
//! Links, images, footnotes and dynamic-fragment invocations all share one
//! syntax: `[...]`. Given the exact text between the outermost bracket pair,
//! [`resolve`] classifies it and produces the corresponding node(s).
//!
//! Resolution order:
//!
//! 1. the two literal escapes `[|]` and `[:]`
//! 2. purely numeric content — footnote forward reference
//! 3. `#` + numeric content — footnote backreference
//! 4. `module:` prefix — explicit dynamic fragment
//! 5. link / image classification on the first-level pipe split
//! 6. internal-link-safe content — implicit wiki link, deferred to the
//!    `pagelink` fragment (display resolution may need a host lookup)
//! 7. anything else echoes back as literal bracketed text
//!
//! Classification never fails a parse; step 7 is the lenient floor.

use crate::weft::ast::{ElementNode, FragmentNode, Node, Span, TextNode};
use once_cell::sync::Lazy;
use regex::Regex;

/// Recognized URL schemes for explicit external links.
static URL_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?|ftp)://").unwrap());

/// File suffixes treated as inline images.
static IMAGE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif)$").unwrap());

/// Characters allowed in an implicit internal link target.
static INTERNAL_SAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w .,'()/:#-]+$").unwrap());

/// Resolve the content of one bracket span into nodes.
pub fn resolve(content: &str, span: Span) -> Vec<Node> {
    match content {
        "|" => return vec![Node::Text(TextNode::new("|", span))],
        ":" => return vec![Node::Text(TextNode::new(":", span))],
        _ => {}
    }

    if !content.is_empty() && content.chars().all(|c| c.is_ascii_digit()) {
        return vec![footnote_forward(content, span)];
    }
    if let Some(number) = content.strip_prefix('#') {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            return vec![footnote_backward(number, span)];
        }
    }
    if let Some(invocation) = content.strip_prefix("module:") {
        return vec![Node::Fragment(FragmentNode::new(invocation, span))];
    }

    let segments: Vec<&str> = content.split('|').collect();
    let head = segments[0].trim();

    if is_link_target(head) {
        if segments.len() >= 2 && IMAGE_SUFFIX.is_match(segments[1].trim()) {
            // Link displayed as an image: [target|image.png|modifiers...]
            let mut link = ElementNode::new("a", span);
            link.set_attr("href", &normalize_target(head));
            link.push_child(Node::Element(image(segments[1].trim(), &segments[2..], span)));
            return vec![Node::Element(link)];
        }
        let mut link = ElementNode::new("a", span);
        link.set_attr("href", &normalize_target(head));
        let display = match content.split_once('|') {
            Some((_, tail)) => tail.to_string(),
            None => derive_display(head),
        };
        link.push_child(Node::Text(TextNode::new(display, span)));
        return vec![Node::Element(link)];
    }

    if IMAGE_SUFFIX.is_match(head) {
        return vec![Node::Element(image(head, &segments[1..], span))];
    }

    if INTERNAL_SAFE.is_match(content) {
        let invocation = format!("pagelink|target={content}");
        return vec![Node::Fragment(FragmentNode::new(invocation, span))];
    }

    vec![Node::Text(TextNode::new(format!("[{content}]"), span))]
}

/// `[3]`: anchor at the reference site, linking down to the footnote body.
fn footnote_forward(number: &str, span: Span) -> Node {
    let mut link = ElementNode::new("a", span);
    link.set_attr("id", &format!("fn{number}"));
    link.set_attr("href", &format!("#fnref{number}"));
    link.set_attr("class", "footnote");
    link.push_child(Node::Text(TextNode::new(format!("[{number}]"), span)));
    Node::Element(link)
}

/// `[#3]`: superscripted backreference from the footnote body to its site.
fn footnote_backward(number: &str, span: Span) -> Node {
    let mut link = ElementNode::new("a", span);
    link.set_attr("id", &format!("fnref{number}"));
    link.set_attr("href", &format!("#fn{number}"));
    link.push_child(Node::Text(TextNode::new(format!("[{number}]"), span)));
    let mut sup = ElementNode::new("sup", span);
    sup.push_child(Node::Element(link));
    Node::Element(sup)
}

/// An explicit link target: URL scheme, internal-link sigil, or user page.
fn is_link_target(head: &str) -> bool {
    URL_SCHEME.is_match(head) || head.starts_with('=') || head.starts_with("user:")
}

/// Map a link head to its final href. External URLs pass through untouched;
/// internal targets are rooted and normalized.
pub fn normalize_target(head: &str) -> String {
    if URL_SCHEME.is_match(head) {
        return head.to_string();
    }
    if let Some(name) = head.strip_prefix("user:") {
        // Profile identifiers are opaque; no segment normalization.
        return format!("/Users/Profile/{}", name.trim());
    }
    let rest = head.strip_prefix('=').unwrap_or(head);
    normalize_internal(rest)
}

/// Normalize an internal path: capitalization per segment, `.html`/`.cgi`
/// stripping, fragment preservation, opaque-identifier passthrough.
pub fn normalize_internal(path: &str) -> String {
    let (path, fragment) = match path.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (path, None),
    };
    let path = path.trim_matches('/');

    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments: Vec<String> = raw.iter().map(|s| title_case_words(s)).collect();

    // Two path shapes carry opaque identifiers in their final segment: a
    // user-profile path and a personal-homepage path.
    let opaque = (segments.len() == 3 && segments[0] == "Users" && segments[1] == "Profile")
        || (segments.len() == 2 && segments[0] == "Homepage");
    if opaque {
        let last = raw[raw.len() - 1].to_string();
        *segments.last_mut().expect("opaque path has segments") = last;
    }

    if let Some(last) = segments.last_mut() {
        *last = strip_page_suffix(last).to_string();
    }

    let mut url = format!("/{}", segments.join("/"));
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

fn strip_page_suffix(segment: &str) -> &str {
    let lower = segment.to_ascii_lowercase();
    if let Some(stripped) = lower.strip_suffix(".html") {
        &segment[..stripped.len()]
    } else if let Some(stripped) = lower.strip_suffix(".cgi") {
        &segment[..stripped.len()]
    } else {
        segment
    }
}

/// Title-case every whitespace-separated word: first character upper,
/// the rest lower. Shared spelling with the heading-id pass.
pub(crate) fn title_case_words(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in segment.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

/// Display text for a link written without one: the target with sigils
/// stripped and trailing slashes/hashes trimmed.
fn derive_display(head: &str) -> String {
    let stripped = head
        .strip_prefix("user:")
        .unwrap_or(head)
        .trim_start_matches('=');
    let trimmed = stripped.trim_end_matches(['/', '#']);
    if trimmed.is_empty() {
        normalize_target(head)
    } else {
        trimmed.to_string()
    }
}

/// Build an `img` element from a source and its trailing modifiers.
fn image(src: &str, modifiers: &[&str], span: Span) -> ElementNode {
    let mut img = ElementNode::new("img", span);
    let src = if src.starts_with('=') || src.starts_with("user:") {
        normalize_target(src)
    } else {
        src.to_string()
    };
    img.set_attr("src", &src);
    for modifier in modifiers {
        let modifier = modifier.trim();
        match modifier {
            "left" => img.set_attr("class", "image-left"),
            "right" => img.set_attr("class", "image-right"),
            _ => {
                if let Some((key, value)) = modifier.split_once('=') {
                    match key.trim() {
                        "title" | "alt" | "height" | "width" => {
                            img.set_attr(key.trim(), value.trim());
                        }
                        // Unrecognized modifiers are silently ignored.
                        _ => {}
                    }
                }
            }
        }
    }
    img
}
