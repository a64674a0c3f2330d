//! `${ref:NAME}` placeholder handling
//!
//! String attribute values may embed references to other resources:
//!
//! ```text
//! compute "web-1" {
//!     subnet "${ref:public-subnet-a}"
//! }
//! ```
//!
//! The placeholder is replaced with the referenced resource's handle id
//! once that resource has been created. Text without a closing brace is
//! left untouched.

const OPEN: &str = "${ref:";

/// Collect the logical names referenced by placeholders in `value`
pub fn placeholder_targets(value: &str) -> Vec<&str> {
    let mut targets = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        match after.find('}') {
            Some(end) => {
                targets.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    targets
}

/// Replace every placeholder in `value` using `resolve`
///
/// Returns the first logical name `resolve` cannot answer as the error.
pub fn substitute<F>(value: &str, mut resolve: F) -> Result<String, String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match resolve(name) {
                    Some(id) => out.push_str(&id),
                    None => return Err(name.to_string()),
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated placeholder, keep the literal text
                out.push_str(&rest[start..]);
                return Ok(out);
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}
