use serde::{Deserialize, Serialize};
use std::fmt;

/// Local domain collections that are wiped together with the queue on a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCollection {
    Products,
    Sales,
    SaleItems,
    Categories,
}

impl EntityCollection {
    pub const ALL: [EntityCollection; 4] = [
        EntityCollection::Products,
        EntityCollection::Sales,
        EntityCollection::SaleItems,
        EntityCollection::Categories,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityCollection::Products => "products",
            EntityCollection::Sales => "sales",
            EntityCollection::SaleItems => "sale_items",
            EntityCollection::Categories => "categories",
        }
    }
}

impl fmt::Display for EntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}
