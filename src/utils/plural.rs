//! Pluralization utilities.

/// Return "s" suffix for plural counts
#[inline]
fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// `plural_count(1, "page")` is `"1 page"`, `plural_count(3, "page")` is `"3 pages"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "notebook"), "0 notebooks");
        assert_eq!(plural_count(1, "notebook"), "1 notebook");
        assert_eq!(plural_count(2, "static file"), "2 static files");
    }
}
