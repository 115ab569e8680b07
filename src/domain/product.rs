use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A juice on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub image: String,
    pub stock: u32,
    #[serde(default)]
    pub popular: bool,
}

/// Params for adding a product to the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub popular: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<u32>,
    pub popular: Option<bool>,
}

impl Product {
    pub fn matches(&self, category: Option<&str>, search: Option<&str>) -> bool {
        if let Some(category) = category {
            if !self.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        match search.map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                self.name.to_lowercase().contains(&query)
                    || self.description.to_lowercase().contains(&query)
            }
            _ => true,
        }
    }
}

/// The storefront's standard range, used to seed an empty catalog.
pub fn default_catalog() -> Vec<ProductCreate> {
    let juice = |name: &str, description: &str, price: i64, category: &str, stock: u32, popular: bool| ProductCreate {
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::from(price),
        category: category.to_string(),
        image: String::new(),
        stock,
        popular,
    };
    vec![
        juice(
            "Classic Orange Juice",
            "Pure, fresh-squeezed orange juice. No additives, just pure goodness.",
            89,
            "classic",
            100,
            true,
        ),
        juice(
            "Pulp Delight",
            "Extra pulpy orange juice for those who love the real fruit texture.",
            99,
            "premium",
            75,
            true,
        ),
        juice(
            "Vitamin Boost",
            "Fortified with extra vitamins and minerals for your daily health needs.",
            119,
            "premium",
            50,
            true,
        ),
    ]
}
