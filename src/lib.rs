//! # weft
//!
//! A parser and renderer for the weft forum/wiki markup format.
//!
//! Parsing produces a tree of text, element, conditional and dynamic
//! fragment nodes; a fixed sequence of document passes finishes the tree;
//! rendering walks it once per viewer through a host-provided
//! [`RenderContext`](weft::render::RenderContext).
//!
//! ## Testing
//!
//! Test helpers live in the [testing module](weft::testing); integration
//! suites under `tests/` exercise the full parse/pass/render pipeline.

pub mod weft;
