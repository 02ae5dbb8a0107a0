//! Header name canonicalization

/// Canonicalize a source column header into a snake_case field name.
///
/// Rules, in order:
/// - lowercase everything
/// - spaces, hyphens, and slashes become underscores
/// - `%` becomes `pct`, `#` becomes `num`
/// - `?`, `.`, and parentheses are dropped
/// - runs of underscores collapse to one, and leading/trailing
///   underscores are stripped
///
/// So `"Net Sales (%)"` becomes `net_sales_pct` and
/// `"Order #?"` becomes `order_num`.
pub fn canonicalize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ' ' | '-' | '/' => out.push('_'),
            '%' => out.push_str("pct"),
            '#' => out.push_str("num"),
            '?' | '.' | '(' | ')' => {}
            _ => out.extend(ch.to_lowercase()),
        }
    }

    while out.contains("__") {
        out = out.replace("__", "_");
    }

    out.trim_matches('_').to_string()
}
