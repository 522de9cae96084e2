//! Identifier casing shared by all generators.
//!
//! Source identifiers are typically snake_case (`hub_customer`,
//! `customer_key`); generated C# uses PascalCase for types and properties
//! and camelCase for fields. Every generator goes through these two
//! functions so casing never diverges between artifacts.

use convert_case::{Case, Casing};

/// Convert a source identifier to PascalCase: `hub_customer` → `HubCustomer`.
pub fn pascal_case(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// Convert a source identifier to camelCase: `customer_key` → `customerKey`.
pub fn camel_case(name: &str) -> String {
    name.to_case(Case::Camel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("hub_customer"), "HubCustomer");
        assert_eq!(pascal_case("sat_customer_details"), "SatCustomerDetails");
        assert_eq!(pascal_case("Person"), "Person");
        assert_eq!(pascal_case("tax_id"), "TaxId");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("customer_key"), "customerKey");
        assert_eq!(camel_case("name"), "name");
        assert_eq!(camel_case("IsCurrent"), "isCurrent");
    }
}
