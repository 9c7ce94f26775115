//! Whole-document integration tests
//!
//! Full pipeline over multi-construct documents, with inline snapshots for
//! the rendered output.

use weft::weft::testing::RecordingContext;
use weft::weft::Document;

fn render(source: &str) -> String {
    Document::parse(source)
        .unwrap()
        .render(&mut RecordingContext::default())
}

#[test]
fn article_with_toc() {
    let source = "\
!Getting Started
Welcome to __weft__.

%%TOC%%

!!Basics
* parse
* render

!!Basics
done
";
    insta::assert_snapshot!(render(source), @r###"<h2 id="GettingStarted">Getting Started</h2><div class="text">Welcome to <b>weft</b>.</div><div class="toc"><ul><li><a href="#GettingStarted">Getting Started</a><ul><li><a href="#Basics">Basics</a></li><li><a href="#Basics_2">Basics</a></li></ul></li></ul></div><h3 id="Basics">Basics</h3><ul><li>parse</li><li>render</li></ul><h3 id="Basics_2">Basics</h3><div class="text">done</div>"###);
}

#[test]
fn toc_depth_normalizes_to_the_shallowest_heading() {
    // Only h3 and h4 present: the generated list has two levels, not three.
    let out = render("%%TOC%%\n!!alpha\n!!!beta\n");
    insta::assert_snapshot!(out, @r###"<div class="toc"><ul><li><a href="#Alpha">alpha</a><ul><li><a href="#Beta">beta</a></li></ul></li></ul></div><h3 id="Alpha">alpha</h3><h4 id="Beta">beta</h4>"###);
}

#[test]
fn tab_groups_restructure_into_links_and_pages() {
    let source = "%%TAB_START\n%%TAB First%\nalpha\n%%TAB Second%\nbeta\n%%TAB_END\n";
    insta::assert_snapshot!(render(source), @r###"<div class="tabs"><ul class="tab-links"><li class="active"><a href="#tab-1">First</a></li><li><a href="#tab-2">Second</a></li></ul><div class="tab-pages"><div class="tab-page active" id="tab-1"><p>alpha</p></div><div class="tab-page" id="tab-2"><p>beta</p></div></div></div>"###);
}

#[test]
fn cellstyle_rules_style_matching_cells() {
    let source = "[module:cellstyle|FAIL|color: red]\n|ok|FAIL|\n";
    assert_eq!(
        render(source),
        "<div class=\"text\"></div><table><tr><td>ok</td><td style=\"color: red\">FAIL</td></tr></table>"
    );
}

#[test]
fn conditional_sections_rerender_per_viewer() {
    let source = "public\n\n[if:moderator]\nhidden tools\n[endif]\n\npublic too\n";
    let doc = Document::parse(source).unwrap();
    let snapshot = doc.clone();

    let staff = doc.render(&mut RecordingContext::allowing(["moderator"]));
    let anon = doc.render(&mut RecordingContext::default());
    assert!(staff.contains("hidden tools"));
    assert!(!anon.contains("hidden tools"));
    assert!(anon.contains("public"));
    // The tree itself is untouched between renders.
    assert_eq!(doc, snapshot);
}

#[test]
fn condition_checked_once_per_conditional() {
    let doc = Document::parse("[if:a]\nx\n[endif]\n[if:b]\ny\n[endif]\n").unwrap();
    let mut ctx = RecordingContext::default();
    doc.render(&mut ctx);
    assert_eq!(ctx.conditions, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn failed_parse_renders_an_annotated_listing() {
    let source = "good line\nbad [line\nlast line\n";
    let err = Document::parse(source).unwrap_err();
    let out = Document::from_error(source, &err).render(&mut RecordingContext::default());
    assert!(out.contains("   1: good line"));
    assert!(out.contains("error-marker"));
    assert!(out.contains("bracket span is never closed"));
    assert!(out.contains("   3: last line"));
}

#[test]
fn finished_tree_serializes_to_json() {
    let doc = Document::parse("!title\n").unwrap();
    let json = serde_json::to_string(doc.nodes()).unwrap();
    assert!(json.contains("\"kind\":\"Element\""));
    assert!(json.contains("\"id\",\"Title\""));
}
