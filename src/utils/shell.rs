//! Shell quoting for displaying command lines.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument so the rendered command line can be pasted into a shell.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Quote and join multiple arguments.
pub fn quote_args(args: &[String]) -> String {
    args.iter()
        .map(|a| quote_arg(a))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bazel_target_pattern_is_not_quoted() {
        assert_eq!(quote_arg("//..."), "//...");
        assert_eq!(quote_arg("-c"), "-c");
    }

    #[test]
    fn label_with_wildcard_is_quoted() {
        assert_eq!(quote_arg("//pkg:*"), "'//pkg:*'");
    }

    #[test]
    fn path_with_spaces_is_quoted() {
        assert_eq!(quote_arg("/opt/my tools/bazel"), "'/opt/my tools/bazel'");
    }

    #[test]
    fn embedded_single_quote_is_escaped() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn empty_arg_is_explicit() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn quote_args_joins_with_spaces() {
        let args = vec![
            "bazel".to_string(),
            "run".to_string(),
            "-c".to_string(),
            "opt".to_string(),
            "//...".to_string(),
        ];
        assert_eq!(quote_args(&args), "bazel run -c opt //...");
    }
}
