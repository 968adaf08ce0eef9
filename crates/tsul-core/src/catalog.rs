//! # Product Catalog
//!
//! The built-in collection and product-page lookup.
//!
//! ## Not-Found Contract
//! ```text
//! ?id=hoodie  + page target present  ──► Found(&Product)
//! ?id=jacket                          ──► NotFound
//! (no id)                             ──► NotFound
//! ?id=hoodie  + no page target        ──► NotFound
//!
//! NotFound renders inline as "Product not found."
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::search::SearchItem;
use crate::validation::{validate_one_of, ValidationResult};

/// Sizes offered on every product.
pub const SIZES: [&str; 3] = ["S", "M", "L"];

/// Size selected when the page opens.
pub const DEFAULT_SIZE: &str = "M";

/// Section the built-in collection is listed under.
pub const COLLECTION_SECTION: &str = "men";

/// Inline text for an unresolvable product page.
pub const NOT_FOUND_MESSAGE: &str = "Product not found.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub images: Vec<String>,
    pub description: String,
    pub material: String,
    pub color: String,
    pub origin: String,
}

impl Product {
    /// Search corpus entry for this product.
    pub fn search_item(&self) -> SearchItem {
        SearchItem::new(self.id.clone(), self.name.clone(), self.price.to_string())
            .in_section(COLLECTION_SECTION)
    }
}

/// Result of resolving a product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductLookup<'a> {
    Found(&'a Product),
    NotFound,
}

impl<'a> ProductLookup<'a> {
    /// Collapses to `NotFound` when there is nowhere to render.
    pub fn require_target(self, target_present: bool) -> Self {
        if target_present {
            self
        } else {
            ProductLookup::NotFound
        }
    }

    pub fn product(&self) -> Option<&'a Product> {
        match self {
            ProductLookup::Found(product) => Some(product),
            ProductLookup::NotFound => None,
        }
    }
}

/// Validates a size selection; `None` picks [`DEFAULT_SIZE`].
pub fn select_size(size: Option<&str>) -> ValidationResult<&'static str> {
    let size = size.map(str::trim).filter(|s| !s.is_empty());
    match size {
        None => Ok(DEFAULT_SIZE),
        Some(s) => {
            let s = validate_one_of("size", s, &SIZES)?;
            // map back onto the 'static entry
            Ok(SIZES.iter().copied().find(|c| *c == s).unwrap_or(DEFAULT_SIZE))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// The Fall/Holiday collection: sweats, hoodie, tee.
    pub fn builtin() -> Self {
        let product = |id: &str, name: &str, image: &str, description: &str, material: &str| {
            Product {
                id: id.to_string(),
                name: name.to_string(),
                price: Money::from_cents(4000),
                images: vec![image.to_string(), image.to_string()],
                description: description.to_string(),
                material: material.to_string(),
                color: "Teal & Blue".to_string(),
                origin: "USA".to_string(),
            }
        };

        Catalog::new(vec![
            product(
                "sweats",
                "TSUL Sweats – Black Colorway",
                "https://i.ibb.co/bgJNGyM4/IMG-4235-1.jpg",
                "Heavyweight comfort with a clean silhouette. Built for layering or lounging.",
                "100% cotton fleece",
            ),
            product(
                "hoodie",
                "TSUL Hoodie – Black Colorway",
                "https://i.ibb.co/3ypNvTrD/IMG-4234.jpg",
                "Relaxed fit with ribbed cuffs and hem. Built for layering and comfort.",
                "Midweight cotton blend",
            ),
            product(
                "tee",
                "TSUL Tee – Black Colorway",
                "https://i.ibb.co/20tN9NzC/IMG-4233.jpg",
                "Lightweight and breathable. Tailored cut for everyday wear.",
                "Soft combed cotton",
            ),
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Resolves the `id` query parameter of a product page.
    pub fn resolve(&self, id: Option<&str>) -> ProductLookup<'_> {
        match id.and_then(|id| self.get(id.trim())) {
            Some(product) => ProductLookup::Found(product),
            None => ProductLookup::NotFound,
        }
    }

    /// Search corpus built from every product, in catalog order.
    pub fn search_corpus(&self) -> Vec<SearchItem> {
        self.products.iter().map(Product::search_item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_collection() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["sweats", "hoodie", "tee"]);
        for p in catalog.products() {
            assert_eq!(p.price.cents(), 4000);
            assert!(p.name.ends_with("Black Colorway"));
            assert_eq!(p.images.len(), 2);
        }
    }

    #[test]
    fn test_resolve_not_found_contract() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.resolve(Some("hoodie")).product().map(|p| p.id.as_str()),
            Some("hoodie")
        );
        assert_eq!(catalog.resolve(Some("jacket")), ProductLookup::NotFound);
        assert_eq!(catalog.resolve(None), ProductLookup::NotFound);
        assert_eq!(
            catalog.resolve(Some("hoodie")).require_target(false),
            ProductLookup::NotFound
        );
    }

    #[test]
    fn test_select_size() {
        assert_eq!(select_size(None), Ok("M"));
        assert_eq!(select_size(Some(" ")), Ok("M"));
        assert_eq!(select_size(Some("L")), Ok("L"));
        assert!(select_size(Some("XL")).is_err());
    }

    #[test]
    fn test_search_corpus() {
        let corpus = Catalog::builtin().search_corpus();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[1].name, "TSUL Hoodie – Black Colorway");
        assert_eq!(corpus[1].price_label, "$40.00");
        assert_eq!(corpus[1].section, COLLECTION_SECTION);
    }
}
