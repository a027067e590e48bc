//! Manifest decoding.
//!
//! Two shapes are accepted, in JSON or YAML:
//!
//! ```text
//! - { slug: intro, markdown: https://x/a.md }
//! - { slug: child, markdown: https://x/b.md, parent: intro, order: 2 }
//! ```
//!
//! ```text
//! intro: { markdown: https://x/a.md }
//! child: { markdown: https://x/b.md, parent: intro, order: 2 }
//! ```
//!
//! Mapping order is preserved. Missing `slug`/`markdown` values decode as
//! empty strings so the entry fails validation on its own instead of
//! rejecting the whole manifest.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ManifestError;
use crate::types::{ManifestEntry, Slug};

/// Ordered list of documents to publish in one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default)]
    slug: Option<Value>,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    parent: Option<Value>,
    #[serde(default)]
    order: Option<i64>,
}

impl RawEntry {
    fn decode(index: usize, value: Value) -> Result<Self, ManifestError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|source| ManifestError::Entry { index, source })
    }

    fn into_entry(self, slug: Option<String>) -> ManifestEntry {
        let parent = self
            .parent
            .as_ref()
            .and_then(scalar_text)
            .filter(|p| !p.is_empty())
            .map(Slug::from);
        let slug = slug.or_else(|| self.slug.as_ref().and_then(scalar_text));
        ManifestEntry {
            slug: Slug::from(slug.unwrap_or_default()),
            source: self.markdown.unwrap_or_default().trim().to_owned(),
            parent,
            order: self.order.unwrap_or(0),
        }
    }
}

/// Text of a scalar, so `slug: 404` and `2024:` keys read as slugs.
/// Null and collections yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Decode a manifest document.
pub fn parse(contents: &str) -> Result<Manifest, ManifestError> {
    if contents.trim().is_empty() {
        return Ok(Manifest::default());
    }

    let entries = match serde_yaml::from_str::<Value>(contents)? {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| RawEntry::decode(index, item).map(|r| r.into_entry(None)))
            .collect::<Result<_, _>>()?,
        Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (index, (key, value)) in map.into_iter().enumerate() {
                let Some(slug) = scalar_text(&key) else {
                    return Err(ManifestError::NonStringKey { index });
                };
                entries.push(RawEntry::decode(index, value)?.into_entry(Some(slug)));
            }
            entries
        }
        other => return Err(ManifestError::Shape { found: kind(&other) }),
    };

    Ok(Manifest { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_form_keeps_order() {
        let json = r#"[
            {"slug": "intro", "markdown": "http://x/a.md"},
            {"slug": "child", "markdown": "http://x/b.md", "parent": "intro", "order": 3}
        ]"#;
        let manifest = parse(json).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries[0].slug, Slug::from("intro"));
        assert_eq!(manifest.entries[0].order, 0);
        assert_eq!(manifest.entries[1].parent, Some(Slug::from("intro")));
        assert_eq!(manifest.entries[1].order, 3);
    }

    #[test]
    fn mapping_form_uses_keys_as_slugs() {
        let json = r#"{
            "zeta": {"markdown": "http://x/z.md"},
            "alpha": {"markdown": "http://x/a.md", "parent": "zeta"}
        }"#;
        let manifest = parse(json).unwrap();
        let slugs: Vec<_> = manifest.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["zeta", "alpha"]);
        assert_eq!(manifest.entries[1].source, "http://x/a.md");
    }

    #[test]
    fn missing_fields_become_invalid_entries() {
        let manifest = parse(r#"[{"markdown": "http://x/a.md"}, {"slug": "b"}]"#).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(manifest.entries[0].validate().is_err());
        assert!(manifest.entries[1].validate().is_err());
    }

    #[test]
    fn blank_parent_is_treated_as_absent() {
        let manifest = parse("- {slug: a, markdown: a.md, parent: ''}\n").unwrap();
        assert_eq!(manifest.entries[0].parent, None);
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = parse("just a string").unwrap_err();
        assert!(matches!(err, ManifestError::Shape { found: "string" }));
        assert!(err.to_string().contains("sequence or mapping"), "{err}");
    }

    #[test]
    fn numeric_slugs_and_parents_read_as_text() {
        let manifest = parse("- {slug: 404, markdown: nf.md, parent: 2024}\n").unwrap();
        assert_eq!(manifest.entries[0].slug, Slug::from("404"));
        assert_eq!(manifest.entries[0].parent, Some(Slug::from("2024")));
        assert!(manifest.entries[0].validate().is_ok());
    }

    #[test]
    fn numeric_mapping_keys_read_as_slugs() {
        let manifest = parse("2024: {markdown: y.md}\nnotes: {markdown: n.md, parent: 2024}\n")
            .unwrap();
        let slugs: Vec<_> = manifest.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["2024", "notes"]);
        assert_eq!(manifest.entries[1].parent, Some(Slug::from("2024")));
    }

    #[test]
    fn collection_key_is_rejected() {
        let err = parse("? [a, b]\n: {markdown: x.md}\n").unwrap_err();
        assert!(matches!(err, ManifestError::NonStringKey { index: 0 }));
    }

    #[test]
    fn malformed_entry_names_its_position() {
        let err = parse("- {slug: a, markdown: a.md}\n- {slug: b, order: soon}\n").unwrap_err();
        assert!(matches!(err, ManifestError::Entry { index: 1, .. }), "{err:?}");
    }

    #[test]
    fn null_mapping_value_is_an_invalid_entry() {
        let manifest = parse("orphan:\n").unwrap();
        assert_eq!(manifest.entries[0].slug, Slug::from("orphan"));
        assert!(manifest.entries[0].validate().is_err());
    }

    #[test]
    fn empty_document_is_empty_manifest() {
        assert!(parse("  \n").unwrap().is_empty());
    }
}
