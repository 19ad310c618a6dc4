/// Escape character paired with [`contains_pattern`] in `LIKE ... ESCAPE`.
pub const LIKE_ESCAPE: char = '\\';

/// `%term%` with the term's own `%`, `_` and `\` matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("sun"), "%sun%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("snake_case"), "%snake\\_case%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
