/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::filter::Predicate;

/// Business area a resource belongs to. Also the unit of role gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    Crm,
    Inventory,
    Procurement,
    AfterSales,
}

impl Area {
    pub const ALL: [Area; 4] = [Area::Crm, Area::Inventory, Area::Procurement, Area::AfterSales];

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Crm => "crm",
            Area::Inventory => "inventory",
            Area::Procurement => "procurement",
            Area::AfterSales => "after-sales",
        }
    }
}

/// Boolean query flags recognized by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    LowStock,
    Critical,
}

impl Flag {
    pub const ALL: [Flag; 2] = [Flag::LowStock, Flag::Critical];

    /// Query-string key for this flag
    pub fn key(&self) -> &'static str {
        match self {
            Flag::LowStock => "lowStock",
            Flag::Critical => "critical",
        }
    }
}

/// Business collections exposed under /api/:resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Customers,
    Leads,
    Opportunities,
    Products,
    Suppliers,
    PurchaseOrders,
    ServiceTickets,
    Deliveries,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Customers,
        Resource::Leads,
        Resource::Opportunities,
        Resource::Products,
        Resource::Suppliers,
        Resource::PurchaseOrders,
        Resource::ServiceTickets,
        Resource::Deliveries,
    ];

    /// URL path segment
    pub fn slug(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Leads => "leads",
            Resource::Opportunities => "opportunities",
            Resource::Products => "products",
            Resource::Suppliers => "suppliers",
            Resource::PurchaseOrders => "purchase-orders",
            Resource::ServiceTickets => "service-tickets",
            Resource::Deliveries => "deliveries",
        }
    }

    /// Storage collection name
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Leads => "leads",
            Resource::Opportunities => "opportunities",
            Resource::Products => "products",
            Resource::Suppliers => "suppliers",
            Resource::PurchaseOrders => "purchase_orders",
            Resource::ServiceTickets => "service_tickets",
            Resource::Deliveries => "deliveries",
        }
    }

    /// Human label for a single document, used in response messages
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Customers => "Customer",
            Resource::Leads => "Lead",
            Resource::Opportunities => "Opportunity",
            Resource::Products => "Product",
            Resource::Suppliers => "Supplier",
            Resource::PurchaseOrders => "Purchase order",
            Resource::ServiceTickets => "Service ticket",
            Resource::Deliveries => "Delivery",
        }
    }

    /// Human label for a collection, used in list messages
    pub fn plural(&self) -> &'static str {
        match self {
            Resource::PurchaseOrders => "purchase orders",
            Resource::ServiceTickets => "service tickets",
            other => other.slug(),
        }
    }

    pub fn area(&self) -> Area {
        match self {
            Resource::Customers | Resource::Leads | Resource::Opportunities => Area::Crm,
            Resource::Products => Area::Inventory,
            Resource::Suppliers | Resource::PurchaseOrders => Area::Procurement,
            Resource::ServiceTickets | Resource::Deliveries => Area::AfterSales,
        }
    }

    /// Fields scanned by the `search` query parameter
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            Resource::Customers => &["name", "email", "company"],
            Resource::Leads => &["name", "email", "source"],
            Resource::Opportunities => &["title", "customerName"],
            Resource::Products => &["name", "sku", "category"],
            Resource::Suppliers => &["name", "email", "contactName"],
            Resource::PurchaseOrders => &["orderNumber", "supplierName"],
            Resource::ServiceTickets => &["subject", "customerName"],
            Resource::Deliveries => &["trackingNumber", "address"],
        }
    }

    /// Predicate a `true` flag adds for this resource. `None` means the
    /// flag has no meaning here and is ignored.
    pub fn flag_predicate(&self, flag: Flag) -> Option<Predicate> {
        match (self, flag) {
            (Resource::Products, Flag::LowStock) => Some(Predicate::AtMostField {
                field: "quantity".to_string(),
                bound: "reorderLevel".to_string(),
            }),
            (Resource::ServiceTickets, Flag::Critical) => Some(Predicate::Equals {
                field: "priority".to_string(),
                value: "critical".to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.slug() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource '{0}'")]
pub struct UnknownResource(pub String);
