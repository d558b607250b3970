//! Naming conventions
//!
//! Destination fields carry PascalCase names (`BodyText`), document fields use
//! lower camel case (`bodyText`). Rust field idents (`body_text`) convert to
//! either form.

/// `BodyText` / `body_text` -> `bodyText`
pub fn to_lower_camel_case(name: &str) -> String {
    let pascal = if name.contains(['_', '-']) {
        to_pascal_case(name)
    } else {
        name.to_string()
    };
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `body_text` / `bodyText` -> `BodyText`
pub fn to_pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
