//! Document locators
//!
//! A locator maps a definition name to the place its rendered documentation
//! lives. The resolver only uses it to tag [`crate::RefType`] results; it never
//! fetches anything.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_FORBIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_-]+").expect("valid name pattern"));

static SEPARATOR_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([_-]){2,}").expect("valid separator pattern"));

/// Maps a reference name to a document-relative locator string.
///
/// Must be total: every name the resolver may look up gets a locator.
pub trait DocumentLocator {
    fn locate(&self, name: &str) -> String;
}

impl<F> DocumentLocator for F
where
    F: Fn(&str) -> String,
{
    fn locate(&self, name: &str) -> String {
        self(name)
    }
}

/// Anchor inside the current document: `#<prefix><normalized name>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineLocator {
    pub prefix: String,
}

impl InlineLocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl DocumentLocator for InlineLocator {
    fn locate(&self, name: &str) -> String {
        format!("#{}{}", self.prefix, normalize_name(name))
    }
}

/// One document per definition: `<folder>/<normalized name>.<extension>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparateFileLocator {
    pub folder: String,
    pub extension: String,
}

impl SeparateFileLocator {
    pub fn new(folder: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            extension: extension.into(),
        }
    }
}

impl DocumentLocator for SeparateFileLocator {
    fn locate(&self, name: &str) -> String {
        let file = format!("{}.{}", normalize_name(name), self.extension.trim_start_matches('.'));
        let folder = self.folder.trim_end_matches('/');
        if folder.is_empty() {
            file
        } else {
            format!("{}/{}", folder, file)
        }
    }
}

/// Anchor- and file-safe form of a name
pub fn normalize_name(name: &str) -> String {
    let replaced = NAME_FORBIDDEN.replace_all(name, "_");
    // A run of separators keeps its last one
    SEPARATOR_RUN
        .replace_all(&replaced, "$1")
        .trim_matches(&['_', '-'][..])
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("User"), "user");
        assert_eq!(normalize_name("Pet Store/v2"), "pet_store_v2");
        assert_eq!(normalize_name("  Order Item  "), "order_item");
        assert_eq!(normalize_name("error-model"), "error-model");
    }

    #[test]
    fn test_normalize_name_collapses_separators() {
        assert_eq!(normalize_name("a -- b"), "a_b");
        assert_eq!(normalize_name("Order__Item"), "order_item");
        assert_eq!(normalize_name("--Pet--"), "pet");
        assert_eq!(normalize_name("a_-b"), "a-b");
    }

    #[test]
    fn test_closure_is_a_locator() {
        let locator = |name: &str| format!("defs.adoc#{}", name);
        assert_eq!(locator.locate("Pet"), "defs.adoc#Pet");
    }

    #[test]
    fn test_inline_locator() {
        let locator = InlineLocator::new("definitions-");
        assert_eq!(locator.locate("Pet Store"), "#definitions-pet_store");
    }

    #[test]
    fn test_separate_file_locator() {
        let locator = SeparateFileLocator::new("definitions/", ".md");
        assert_eq!(locator.locate("OrderItem"), "definitions/orderitem.md");

        let flat = SeparateFileLocator::new("", "adoc");
        assert_eq!(flat.locate("Pet"), "pet.adoc");
    }
}
