//! Entity set naming for the Dataverse Web API
//!
//! Collection URLs use the plural entity set name. The connector derives it
//! from the logical name with a fixed three-rule heuristic instead of asking
//! the metadata endpoint, so the same input always maps to the same path.

/// Convert an entity logical name to its entity set name
///
/// - trailing `y` becomes `ies` (`category` -> `categories`)
/// - trailing `s` gets `es` (`address` -> `addresses`)
/// - anything else gets `s` (`contact` -> `contacts`)
pub fn pluralize_entity_name(entity_name: &str) -> String {
    if entity_name.is_empty() {
        return entity_name.to_string();
    }

    if let Some(stem) = entity_name.strip_suffix('y') {
        return format!("{}ies", stem);
    }

    if entity_name.ends_with('s') {
        return format!("{}es", entity_name);
    }

    format!("{}s", entity_name)
}
