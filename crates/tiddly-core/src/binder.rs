//! Positional argument substitution for action templates.
//!
//! A template element of the form `$N` (N a non-negative base-10 integer)
//! is replaced by the Nth runtime argument. Anything else, including
//! malformed or out-of-range placeholders, passes through untouched.

/// Resolve `template` against `args`. The output always has the same length
/// and order as `template`.
pub fn bind(template: &[String], args: &[String]) -> Vec<String> {
    template
        .iter()
        .map(|token| match placeholder_index(token) {
            Some(i) if i < args.len() => args[i].clone(),
            _ => token.clone(),
        })
        .collect()
}

/// Returns the index named by a `$N` token, or `None` for a literal.
fn placeholder_index(token: &str) -> Option<usize> {
    let digits = token.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn substitutes_first_argument() {
        assert_eq!(
            bind(&strings(&["$0"]), &strings(&["file.html"])),
            strings(&["file.html"])
        );
    }

    #[test]
    fn out_of_range_index_passes_through() {
        assert_eq!(bind(&strings(&["$5"]), &strings(&["a"])), strings(&["$5"]));
    }

    #[test]
    fn negative_index_passes_through() {
        assert_eq!(bind(&strings(&["$-1"]), &strings(&["a"])), strings(&["$-1"]));
    }

    #[test]
    fn literal_with_no_args() {
        assert_eq!(bind(&strings(&["literal"]), &[]), strings(&["literal"]));
    }

    #[test]
    fn lone_dollar_and_signed_digits_are_literals() {
        let args = strings(&["a", "b"]);
        assert_eq!(
            bind(&strings(&["$", "$+1", "$1x", "x$1"]), &args),
            strings(&["$", "$+1", "$1x", "x$1"])
        );
    }

    #[test]
    fn mixes_literals_and_placeholders_in_order() {
        let template = strings(&["echo", "$1", "stored", "$0"]);
        let bound = bind(&template, &strings(&["notes.html", "extra"]));
        assert_eq!(bound, strings(&["echo", "extra", "stored", "notes.html"]));
    }

    #[test]
    fn leading_zeros_still_index() {
        assert_eq!(bind(&strings(&["$01"]), &strings(&["a", "b"])), strings(&["b"]));
    }

    #[test]
    fn huge_index_is_literal() {
        let token = "$99999999999999999999999999";
        assert_eq!(bind(&strings(&[token]), &strings(&["a"])), strings(&[token]));
    }

    #[test]
    fn output_length_matches_template() {
        let args = strings(&["x"]);
        for template in [
            vec![],
            strings(&["$0"]),
            strings(&["$0", "$1", "$2", "lit"]),
        ] {
            assert_eq!(bind(&template, &args).len(), template.len());
        }
    }
}
