//! Free-text product search for the list view.

use crate::category::CategoryIndex;
use crate::product::Product;

/// Products whose name or category contains `query`, case-insensitively.
///
/// A blank query returns everything. Order is preserved.
pub fn search(products: &[Product], query: &str, index: &CategoryIndex) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || index.resolve(&p.category).to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
