//! In-memory aggregate of card quantities across merged `*.coll2` files.

use crate::coll2::{self, Item};
use crate::error::{MergeError, Result};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Regular and foil counts for one card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quantities {
    pub regular: u64,
    pub foil: u64,
}

/// Card quantities summed over every merged file.
///
/// The version of the first merged file is recorded and every later file must
/// carry the same one. Cards keep the order in which they were first seen.
#[derive(Debug, Default)]
pub struct Collection {
    version: Option<i64>,
    cards: IndexMap<i64, Quantities>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format version recorded from the first merged file.
    pub fn version(&self) -> Option<i64> {
        self.version
    }

    pub fn get(&self, id: i64) -> Option<Quantities> {
        self.cards.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, Quantities)> + '_ {
        self.cards.iter().map(|(&id, &quantities)| (id, quantities))
    }

    /// Read a `*.coll2` file and merge it.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|source| MergeError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_str(&path.display().to_string(), &text)
    }

    /// Parse `*.coll2` text and merge it. `origin` names the source in errors.
    pub fn add_str(&mut self, origin: &str, text: &str) -> Result<()> {
        let document: Value =
            serde_yaml::from_str(text).map_err(|e| MergeError::MalformedDocument {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
        self.add_document(origin, &document)
    }

    /// Merge an already parsed `*.coll2` document.
    ///
    /// The whole document is decoded and its version checked before anything
    /// is added, so a failing source leaves the collection untouched.
    pub fn add_document(&mut self, origin: &str, document: &Value) -> Result<()> {
        let decoded = coll2::decode(document).map_err(|e| MergeError::MalformedDocument {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;

        match self.version {
            None => self.version = Some(decoded.version),
            Some(expected) if expected != decoded.version => {
                return Err(MergeError::VersionMismatch {
                    origin: origin.to_string(),
                    expected,
                    found: decoded.version,
                });
            }
            Some(_) => {}
        }

        for item in &decoded.items {
            self.add_item(*item);
        }
        info!(
            origin,
            items = decoded.items.len(),
            cards = self.cards.len(),
            "merged collection"
        );
        Ok(())
    }

    fn add_item(&mut self, item: Item) {
        let entry = self.cards.entry(item.id).or_default();
        entry.regular = entry.regular.saturating_add(item.regular);
        entry.foil = entry.foil.saturating_add(item.foil);
    }

    /// Render the collection as a `*.coll2` document tree.
    pub fn to_document(&self) -> Value {
        coll2::encode(
            self.version,
            self.iter().map(|(id, q)| Item {
                id,
                regular: q.regular,
                foil: q.foil,
            }),
        )
    }

    /// Render the collection as `*.coll2` text.
    pub fn to_coll2(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_document())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const SIMPLE: &str = "doc:
- version: 1
- items:
  - - id: 100
    - r: 2
  - - id: 200
    - r: 1
    - f: 3
  - - id: 300
    - f: 1
  - - id: 400
";

    const HALF1: &str = "doc:
- version: 1
- items:
  - - id: 100
    - r: 2
  - - id: 200
    - f: 3
";

    const HALF2: &str = "doc:
- version: 1
- items:
  - - id: 300
    - r: 4
  - - id: 200
    - r: 1
    - f: 1
";

    const VERSION_TWO: &str = "doc:
- version: 2
- items:
  - - id: 100
    - r: 9
";

    fn load(sources: &[&str]) -> Collection {
        let mut collection = Collection::new();
        for (i, text) in sources.iter().enumerate() {
            collection.add_str(&format!("source{i}"), text).unwrap();
        }
        collection
    }

    fn quantities(collection: &Collection) -> BTreeMap<i64, Quantities> {
        collection.iter().collect()
    }

    fn q(regular: u64, foil: u64) -> Quantities {
        Quantities { regular, foil }
    }

    #[test]
    fn load_then_render_restores_document() {
        let collection = load(&[SIMPLE]);
        let expected: Value = serde_yaml::from_str(SIMPLE).unwrap();
        assert_eq!(collection.to_document(), expected);
    }

    #[test]
    fn rendered_text_is_stable_across_reloads() {
        let first = load(&[SIMPLE]).to_coll2().unwrap();
        let second = load(&[first.as_str()]).to_coll2().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn loading_twice_doubles_every_entry() {
        let collection = load(&[SIMPLE, SIMPLE]);
        assert_eq!(
            quantities(&collection),
            BTreeMap::from([
                (100, q(4, 0)),
                (200, q(2, 6)),
                (300, q(0, 2)),
                (400, q(0, 0)),
            ])
        );
        assert_eq!(collection.get(500), None);
    }

    #[test]
    fn merge_sums_shared_cards_and_keeps_the_rest() {
        let collection = load(&[HALF1, HALF2]);
        assert_eq!(
            quantities(&collection),
            BTreeMap::from([(100, q(2, 0)), (200, q(1, 4)), (300, q(4, 0))])
        );
        let order: Vec<i64> = collection.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![100, 200, 300]);
    }

    #[test]
    fn disjoint_merge_is_a_union() {
        let other = "doc:\n- version: 1\n- items:\n  - - id: 900\n    - f: 2\n";
        let collection = load(&[HALF1, other]);
        assert_eq!(
            quantities(&collection),
            BTreeMap::from([(100, q(2, 0)), (200, q(0, 3)), (900, q(0, 2))])
        );
    }

    #[test]
    fn merge_order_does_not_change_quantities() {
        let ab = load(&[HALF1, HALF2]);
        let ba = load(&[HALF2, HALF1]);
        assert_eq!(quantities(&ab), quantities(&ba));
        let order: Vec<i64> = ba.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![300, 200, 100]);
    }

    #[test]
    fn version_mismatch_leaves_collection_untouched() {
        let mut collection = load(&[SIMPLE]);
        let before = collection.to_document();

        let err = collection.add_str("b.coll2", VERSION_TWO).unwrap_err();
        assert!(matches!(
            err,
            MergeError::VersionMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("b.coll2"));
        assert_eq!(collection.to_document(), before);
        assert_eq!(collection.version(), Some(1));
    }

    #[test]
    fn malformed_source_leaves_collection_untouched() {
        let mut collection = load(&[SIMPLE]);
        let before = collection.to_document();
        // second item is bad; the first must not be applied either
        let bad = "doc:\n- version: 1\n- items:\n  - - id: 100\n    - r: 1\n  - - r: 1\n";

        let err = collection.add_str("bad.coll2", bad).unwrap_err();
        assert!(matches!(err, MergeError::MalformedDocument { .. }));
        assert!(err.to_string().starts_with("bad.coll2: "));
        assert_eq!(collection.to_document(), before);
    }

    #[test]
    fn yaml_syntax_error_is_malformed() {
        let mut collection = Collection::new();
        let err = collection.add_str("broken", "doc: [\n").unwrap_err();
        assert!(matches!(err, MergeError::MalformedDocument { .. }));
        assert_eq!(collection.version(), None);
    }

    #[test]
    fn id_only_entry_renders_without_quantities() {
        let collection = load(&["doc:\n- version: 1\n- items:\n  - - id: 42\n"]);
        let expected: Value =
            serde_yaml::from_str("doc:\n- version: 1\n- items:\n  - - id: 42\n").unwrap();
        assert_eq!(collection.get(42), Some(q(0, 0)));
        assert_eq!(collection.to_document(), expected);
    }

    #[test]
    fn empty_collection_renders_null_version() {
        let collection = Collection::new();
        assert!(collection.is_empty());
        let expected: Value =
            serde_yaml::from_str("doc:\n- version: null\n- items: []\n").unwrap();
        assert_eq!(collection.to_document(), expected);
    }

    #[test]
    fn quantities_saturate() {
        let big = format!(
            "doc:\n- version: 1\n- items:\n  - - id: 1\n    - r: {}\n",
            u64::MAX
        );
        let collection = load(&[big.as_str(), big.as_str()]);
        assert_eq!(collection.get(1), Some(q(u64::MAX, 0)));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let mut collection = Collection::new();
        let err = collection
            .add_file(Path::new("/nonexistent/collection.coll2"))
            .unwrap_err();
        assert!(matches!(err, MergeError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("/nonexistent/collection.coll2"));
    }
}
