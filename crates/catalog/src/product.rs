//! Product record and the add/edit form it is created from.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use storefront_core::{DomainError, Entity, Price, ProductId};
use storefront_storage::Fields;

use crate::error::CatalogError;
use crate::seed::DEFAULT_IMAGE;

/// A catalog product.
///
/// `category` is a *category reference*: either a registry identifier or a
/// free-text label. Use [`crate::CategoryIndex::resolve`] to get the name to
/// display, filter or sort by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    /// Build a product from validated form data.
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            price: draft.price,
            image: draft.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            description: draft.description,
            category: draft.category,
        }
    }

    /// Replace every editable field, keeping the identity.
    pub fn apply_draft(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.price = draft.price;
        self.description = draft.description;
        self.category = draft.category;
        if let Some(image) = draft.image {
            self.image = image;
        }
    }

    /// Document fields for the remote store (the id lives in the document name).
    pub fn to_fields(&self) -> Result<Fields, CatalogError> {
        let price = self
            .price
            .to_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| CatalogError::validation(format!("price {} cannot be stored", self.price)))?;

        let mut fields = Fields::new();
        fields.insert("name".into(), Value::String(self.name.clone()));
        fields.insert("price".into(), Value::Number(price));
        fields.insert("image".into(), Value::String(self.image.clone()));
        fields.insert("description".into(), Value::String(self.description.clone()));
        fields.insert("category".into(), Value::String(self.category.clone()));
        Ok(fields)
    }
}

/// Raw add/edit form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub image: String,
}

/// Validated product data, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
}

impl ProductDraft {
    /// Validate form input.
    ///
    /// Name, price, description and category are required; the price must be
    /// a positive number. The image is optional.
    pub fn from_form(form: &ProductForm) -> Result<Self, DomainError> {
        let required = [&form.name, &form.price, &form.description, &form.category];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::validation("Please fill in all required fields"));
        }

        let price = Price::parse(&form.price)?;
        let image = Some(form.image.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: form.name.trim().to_string(),
            price,
            description: form.description.trim().to_string(),
            category: form.category.trim().to_string(),
            image,
        })
    }

    /// The same draft with a different category reference.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl From<&Product> for ProductForm {
    /// Pre-fill an edit form from an existing product.
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Desk Lamp".into(),
            price: "24.50".into(),
            description: "Warm light".into(),
            category: "Home".into(),
            image: String::new(),
        }
    }

    #[test]
    fn valid_form_produces_a_draft() {
        let draft = ProductDraft::from_form(&form()).unwrap();
        assert_eq!(draft.name, "Desk Lamp");
        assert_eq!(draft.price.display(), "$24.50");
        assert_eq!(draft.image, None);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut f = form();
        f.description = "  ".into();
        let err = ProductDraft::from_form(&f).unwrap_err();
        assert_eq!(err, DomainError::validation("Please fill in all required fields"));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let mut f = form();
        f.price = "abc".into();
        let err = ProductDraft::from_form(&f).unwrap_err();
        assert_eq!(err, DomainError::validation("Please enter a valid price"));
    }

    #[test]
    fn empty_image_falls_back_to_placeholder() {
        let draft = ProductDraft::from_form(&form()).unwrap();
        let product = Product::from_draft(ProductId::new("9").unwrap(), draft);
        assert_eq!(product.image, DEFAULT_IMAGE);
    }

    #[test]
    fn edit_form_round_trips_through_validation() {
        let product = Product::from_draft(
            ProductId::new("9").unwrap(),
            ProductDraft::from_form(&form()).unwrap(),
        );
        let again = ProductDraft::from_form(&ProductForm::from(&product)).unwrap();
        assert_eq!(again.price, product.price);
        assert_eq!(again.image.as_deref(), Some(DEFAULT_IMAGE));
    }

    #[test]
    fn fields_omit_the_id() {
        let product = Product::from_draft(
            ProductId::new("9").unwrap(),
            ProductDraft::from_form(&form()).unwrap(),
        );
        let fields = product.to_fields().unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["price"], serde_json::json!(24.5));
        assert!(fields["price"].is_number());
    }
}
