//! Heading-id assignment
//!
//! Every TOC-eligible heading (`h2`, `h3`, `h4`) gets a unique id derived
//! from its flattened inner text: non-alphanumerics become spaces, each word
//! is title-cased, and the words are concatenated. A leading `The`/`A` word
//! is dropped when that shorter form is still free; collisions fall back to
//! `_2`, `_3`, ... suffixes.

use std::collections::HashSet;

use crate::weft::ast::{ElementNode, Node};

pub fn assign_ids(nodes: &mut [Node]) {
    let mut used = HashSet::new();
    walk(nodes, &mut used);
}

fn walk(nodes: &mut [Node], used: &mut HashSet<String>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if matches!(el.tag(), "h2" | "h3" | "h4") {
                assign(el, used);
            }
        }
        if let Some(children) = node.children_mut() {
            walk(children, used);
        }
    }
}

fn assign(el: &mut ElementNode, used: &mut HashSet<String>) {
    let words = id_words(el);
    if words.is_empty() {
        // A heading with no alphanumeric text gets no id and is skipped by
        // the TOC pass.
        return;
    }

    let mut candidates = Vec::new();
    if words.len() > 1 && matches!(words[0].as_str(), "The" | "A") {
        candidates.push(words[1..].concat());
    }
    candidates.push(words.concat());

    let chosen = match candidates.into_iter().find(|c| !used.contains(c)) {
        Some(free) => free,
        None => {
            let base = words.concat();
            let mut n = 2;
            loop {
                let candidate = format!("{base}_{n}");
                if !used.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        }
    };
    used.insert(chosen.clone());
    el.set_attr("id", &chosen);
}

/// Title-cased words of the heading's flattened text, non-alphanumerics
/// treated as word breaks.
fn id_words(el: &ElementNode) -> Vec<String> {
    let mut text = String::new();
    for child in &el.children {
        child.flatten_into(&mut text);
    }
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .map(|word| {
            let mut out = String::new();
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::parser::Parser;

    fn heading_ids(source: &str) -> Vec<String> {
        let mut nodes = Parser::parse(source).unwrap();
        assign_ids(&mut nodes);
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Element(el) if matches!(el.tag(), "h2" | "h3" | "h4") => {
                    Some(el.attr("id").unwrap_or("<none>").to_string())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn id_derives_from_flattened_text() {
        assert_eq!(heading_ids("!my heading!\n"), vec!["MyHeading"]);
    }

    #[test]
    fn duplicate_headings_get_numeric_suffixes() {
        assert_eq!(
            heading_ids("!Foo\n!Foo\n!Foo\n"),
            vec!["Foo", "Foo_2", "Foo_3"]
        );
    }

    #[test]
    fn leading_article_drops_when_free() {
        assert_eq!(
            heading_ids("!The Plan\n!Plan\n"),
            vec!["Plan", "Plan_2"]
        );
    }

    #[test]
    fn leading_article_keeps_when_taken() {
        assert_eq!(
            heading_ids("!Plan\n!The Plan\n"),
            vec!["Plan", "ThePlan"]
        );
    }

    #[test]
    fn markup_inside_heading_still_flattens() {
        assert_eq!(heading_ids("!some __bold__ words\n"), vec!["SomeBoldWords"]);
    }

    #[test]
    fn h5_is_not_toc_eligible() {
        let mut nodes = Parser::parse("!!!!deep\n").unwrap();
        assign_ids(&mut nodes);
        let Node::Element(el) = &nodes[0] else {
            panic!("expected heading");
        };
        assert_eq!(el.tag(), "h5");
        assert_eq!(el.attr("id"), None);
    }
}
