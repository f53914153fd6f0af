//! Catalog product types.

use layercraft_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::appwrite::Document;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Short description shown on product cards.
    pub description: String,
    /// Long description shown on the detail page.
    pub detailed_description: String,
    pub category: String,
    pub price: Price,
    /// Whether the product can be personalised through a custom request.
    pub customizable: bool,
    pub dimensions: String,
    pub material: String,
    pub weight: String,
}

/// Product attributes as stored in the products collection.
///
/// Also the input for creating a product and the entry format of seed files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detailed_description: String,
    pub category: String,
    /// Unit price in USD. Stored as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub customizable: bool,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub weight: String,
}

impl Product {
    /// Attach an ID to stored attributes.
    #[must_use]
    pub fn from_parts(id: ProductId, attrs: NewProduct) -> Self {
        Self {
            id,
            name: attrs.name,
            image: attrs.image,
            description: attrs.description,
            detailed_description: attrs.detailed_description,
            category: attrs.category,
            price: Price::usd(attrs.price),
            customizable: attrs.customizable,
            dimensions: attrs.dimensions,
            material: attrs.material,
            weight: attrs.weight,
        }
    }
}

impl From<Document<NewProduct>> for Product {
    fn from(doc: Document<NewProduct>) -> Self {
        Self::from_parts(ProductId::new(doc.id), doc.data)
    }
}

/// Product listing filter.
///
/// Both criteria are optional; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}

impl ProductFilter {
    /// Filter on a search term only.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            category: None,
        }
    }

    /// Filter on a category only.
    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            search: None,
            category: Some(category.into()),
        }
    }

    /// Whether `product` passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let matches_search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .is_none_or(|term| {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            });

        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|category| product.category == category);

        matches_search && matches_category
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A product priced at `price` dollars.
    pub(crate) fn product(id: &str, price: i64) -> Product {
        Product::from_parts(
            ProductId::new(id),
            NewProduct {
                name: format!("Product {id}"),
                image: format!("https://cdn.example.com/{id}.jpg"),
                description: "Printed in PLA".to_string(),
                detailed_description: String::new(),
                category: "Decor".to_string(),
                price: Decimal::new(price, 0),
                customizable: false,
                dimensions: "10 x 10 x 10 cm".to_string(),
                material: "PLA".to_string(),
                weight: "120 g".to_string(),
            },
        )
    }
}
