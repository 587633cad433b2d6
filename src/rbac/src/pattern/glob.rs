//! Path glob translation
//!
//! Globs are translated to regular expression source and compiled by the
//! regex engine, so both pattern kinds share one matcher type.

/// Path separator
pub const SEPARATOR: char = '/';

/// Translates a path glob into an unanchored regular expression body
///
/// - `?` matches exactly one character except the separator
/// - `*` matches zero or more characters except the separator
/// - `**` matches zero or more characters, separators included
///
/// Every other character matches itself literally.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                // Runs of three or more stars collapse into one `**`
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_translation() {
        assert_eq!(glob_to_regex("data/info"), "data/info");
        assert_eq!(glob_to_regex("a.b+c"), r"a\.b\+c");
    }

    #[test]
    fn test_wildcard_translation() {
        assert_eq!(glob_to_regex("data/*"), "data/[^/]*");
        assert_eq!(glob_to_regex("data/**"), "data/.*");
        assert_eq!(glob_to_regex("file?.txt"), r"file[^/]\.txt");
        assert_eq!(glob_to_regex("a/***"), "a/.*");
    }
}
