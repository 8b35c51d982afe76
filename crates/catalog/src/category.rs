//! Category records and the id → display-name lookup table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{CategoryId, Entity};
use storefront_storage::Document;

/// Document field holding the category display name.
pub const NAME_FIELD: &str = "CatName";

/// Document field holding the creation timestamp (when written explicitly).
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Maximum length of a category name.
pub const MAX_NAME_LEN: usize = 50;

/// A category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Category {
    /// Decode a registry document. Returns `None` for records without a name.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let name = doc.field(NAME_FIELD)?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }
        let id = CategoryId::new(doc.id.clone()).ok()?;
        let created_at = doc
            .field(CREATED_AT_FIELD)
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .or(doc.create_time);

        Some(Self {
            id,
            name: name.to_string(),
            created_at,
        })
    }

    /// A category whose identifier is its own label (local catalogs).
    pub fn label(name: &str) -> Option<Self> {
        Some(Self {
            id: CategoryId::new(name).ok()?,
            name: name.to_string(),
            created_at: None,
        })
    }
}

/// Lookup table built from the registry contents.
///
/// A product's category reference resolves to the registry name when it is a
/// known identifier, otherwise it is taken literally.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_id: HashMap<CategoryId, String>,
    by_name: HashMap<String, Vec<CategoryId>>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let mut index = Self::default();
        for category in categories {
            index
                .by_id
                .entry(category.id.clone())
                .or_insert_with(|| category.name.clone());
            // Duplicate names can exist (racing bootstraps); keep them in store order.
            let ids = index.by_name.entry(category.name.clone()).or_default();
            if !ids.contains(&category.id) {
                ids.push(category.id.clone());
            }
        }
        index
    }

    /// Display name for a product's category reference.
    pub fn resolve<'a>(&'a self, reference: &'a str) -> &'a str {
        // Ids are never blank, so a blank reference is always a literal.
        match CategoryId::new(reference) {
            Ok(id) => self.by_id.get(&id).map(String::as_str).unwrap_or(reference),
            Err(_) => reference,
        }
    }

    /// Registry name of a category identifier.
    pub fn name_of(&self, id: &CategoryId) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    /// First identifier registered for a display name.
    pub fn id_for_name(&self, name: &str) -> Option<&CategoryId> {
        self.ids_for_name(name).first()
    }

    /// Every identifier registered under a display name.
    pub fn ids_for_name(&self, name: &str) -> &[CategoryId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: CategoryId::new(id).unwrap(),
            name: name.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn resolves_ids_and_passes_literals_through() {
        let index = CategoryIndex::new(&[category("c1", "Shoes"), category("c2", "Mobile")]);
        assert_eq!(index.resolve("c1"), "Shoes");
        assert_eq!(index.resolve("Shoes"), "Shoes");
        assert_eq!(index.resolve("Garden"), "Garden");
        assert_eq!(index.resolve(""), "");
    }

    #[test]
    fn duplicate_names_keep_the_first_identifier() {
        let index = CategoryIndex::new(&[category("c1", "TV"), category("c9", "TV")]);
        assert_eq!(index.id_for_name("TV").unwrap().as_str(), "c1");
        assert_eq!(index.name_of(&CategoryId::new("c9").unwrap()), Some("TV"));
        assert_eq!(index.len(), 2);
        let ids: Vec<&str> = index.ids_for_name("TV").iter().map(CategoryId::as_str).collect();
        assert_eq!(ids, ["c1", "c9"]);
        assert!(index.ids_for_name("Garden").is_empty());
    }

    #[test]
    fn decodes_registry_documents() {
        let doc = Document {
            id: "abc".into(),
            fields: json!({"CatName": " Laptop "}).as_object().cloned().unwrap(),
            create_time: Some(Utc::now()),
        };
        let category = Category::from_document(&doc).unwrap();
        assert_eq!(category.name, "Laptop");
        assert_eq!(category.created_at, doc.create_time);

        let nameless = Document {
            id: "x".into(),
            fields: json!({"other": 1}).as_object().cloned().unwrap(),
            create_time: None,
        };
        assert!(Category::from_document(&nameless).is_none());
    }

    #[test]
    fn explicit_created_at_field_wins_over_store_time() {
        let doc = Document {
            id: "abc".into(),
            fields: json!({"CatName": "TV", "createdAt": "2024-01-02T03:04:05Z"})
                .as_object()
                .cloned()
                .unwrap(),
            create_time: Some(Utc::now()),
        };
        let category = Category::from_document(&doc).unwrap();
        assert_eq!(category.created_at.unwrap().to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }
}
