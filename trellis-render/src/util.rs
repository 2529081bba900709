use crate::error::{RenderError, Result};

/// `backgroundColor` → `background-color`.
pub fn camel_case_to_dash_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Views an alternating `[name, value, name, value, ..]` list as pairs.
pub fn attr_pairs(list: &[String]) -> Result<impl Iterator<Item = (&str, &str)>> {
    if list.len() % 2 != 0 {
        return Err(RenderError::OddAttributeList(list.len()));
    }
    Ok(list
        .chunks_exact(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str())))
}
