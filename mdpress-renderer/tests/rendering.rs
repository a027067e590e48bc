use mdpress_renderer::{Converter, UNTITLED};

const GUIDE: &str = "# Operator guide

Run the sync **nightly**.

```sh
mdpress sync
```

- [x] configure
- [ ] publish

Footnote here[^1].

[^1]: Details.
";

#[test]
fn full_document_renders_body_without_title() {
    let doc = Converter::new().convert(GUIDE);

    assert_eq!(doc.title, "Operator guide");
    assert!(!doc.html.contains("Operator guide"), "title must not be rendered twice");
    assert!(doc.html.contains("<strong>nightly</strong>"));
    assert!(doc.html.contains("<code class=\"language-sh\">"));
    assert!(doc.html.contains("type=\"checkbox\""));
    assert!(doc.html.contains("footnote"));
}

#[test]
fn arbitrary_text_never_panics() {
    let inputs = [
        "\n\n\n",
        "#",
        "<div>unclosed",
        "```\nno closing fence",
        "[broken](link",
        "\u{feff}# BOM title\nbody",
        "| only | header |",
    ];
    for input in inputs {
        let doc = Converter::new().convert(input);
        assert!(!doc.title.is_empty(), "title empty for {input:?}");
    }
}

#[test]
fn blank_first_line_falls_back_to_untitled() {
    let doc = Converter::new().convert("\n# Real heading\ntext");
    assert_eq!(doc.title, UNTITLED);
    assert!(doc.html.contains("<h1>Real heading</h1>"));
}

#[test]
fn byte_order_mark_is_ignored() {
    let doc = Converter::new().convert("\u{feff}# Notes\nbody");
    assert_eq!(doc.title, "Notes");
}
