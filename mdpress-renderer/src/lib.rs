//! # mdpress-renderer
//!
//! pulldown-cmark based converter that turns a Markdown document into a page
//! title and an HTML body.
//!
//! ## Usage
//!
//! ```rust
//! use mdpress_renderer::convert;
//!
//! let doc = convert("# Getting started\nInstall the tool.");
//! assert_eq!(doc.title, "Getting started");
//! assert!(doc.html.contains("<p>Install the tool.</p>"));
//! ```

pub mod converter;

pub use converter::{convert, Converter, Document, UNTITLED};
