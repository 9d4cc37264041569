//! Command-line codec — the combined binary-path string the SCM stores.
//!
//! The native API keeps the executable and its arguments as one string;
//! svckit keeps them as two descriptor fields and converts at the boundary.

/// Compose `path` and `arguments` into the combined binary-path string.
///
/// The path is always quoted; a single space plus `arguments` follows when
/// non-empty. [`decompose`] inverts this for any path without embedded quotes.
pub fn compose(path: &str, arguments: &str) -> String {
    let mut combined = format!("\"{path}\"");
    if !arguments.is_empty() {
        combined.push(' ');
        combined.push_str(arguments);
    }
    combined
}

/// Split a combined binary-path string into `(path, arguments)`.
///
/// A leading quote delimits the path up to the next quote, even when that
/// makes the path empty (`"" -x`). An opening quote with no closing quote is
/// ambiguous; the whole string is then taken as the path, quote included.
/// Without a leading quote the path runs to the first space.
pub fn decompose(combined: &str) -> (String, String) {
    let trimmed = combined.trim();
    if trimmed.starts_with('"') {
        let rest = &trimmed[1..];
        if let Some(end) = rest.find('"') {
            return (rest[..end].to_string(), rest[end + 1..].trim().to_string());
        }
        return (trimmed.to_string(), String::new());
    }
    match trimmed.find(' ') {
        Some(idx) => (
            trimmed[..idx].to_string(),
            trimmed[idx + 1..].trim().to_string(),
        ),
        None => (trimmed.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::quoted(r#""C:\Program Files\app.exe" -x -y"#, r"C:\Program Files\app.exe", "-x -y")]
    #[case::unquoted_with_args(r"C:\app.exe -x", r"C:\app.exe", "-x")]
    #[case::unquoted_bare(r"C:\app.exe", r"C:\app.exe", "")]
    #[case::quoted_bare(r#""C:\app.exe""#, r"C:\app.exe", "")]
    #[case::empty_quoted_path(r#""" -x"#, "", "-x")]
    fn decompose_splits_path_and_arguments(
        #[case] combined: &str,
        #[case] path: &str,
        #[case] args: &str,
    ) {
        assert_eq!(decompose(combined), (path.to_string(), args.to_string()));
    }

    #[test]
    fn unterminated_quote_keeps_whole_string_as_path() {
        let (path, args) = decompose(r#""C:\Program Files\app.exe -x"#);
        assert_eq!(path, r#""C:\Program Files\app.exe -x"#);
        assert_eq!(args, "");
    }

    #[test]
    fn compose_quotes_path_and_appends_arguments() {
        assert_eq!(compose(r"C:\app\a.exe", "--flag"), r#""C:\app\a.exe" --flag"#);
        assert_eq!(compose(r"C:\app\a.exe", ""), r#""C:\app\a.exe""#);
    }

    #[rstest]
    #[case(r"C:\Program Files\app.exe", "-x -y")]
    #[case(r"C:\app.exe", "")]
    #[case("/usr/local/bin/tool", "--verbose --retries 3")]
    fn compose_decompose_roundtrip(#[case] path: &str, #[case] args: &str) {
        assert_eq!(
            decompose(&compose(path, args)),
            (path.to_string(), args.to_string())
        );
    }
}
