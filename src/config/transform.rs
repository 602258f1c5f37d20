//! The clean/unclean line transforms.
//!
//! `clean` rewrites a raw configuration line into the grammar the
//! structured reader understands; `unclean` reverses it exactly. For every
//! line `clean` rewrites, `unclean(clean(line)) == line`.

use std::sync::OnceLock;

use regex::Regex;

/// Marker prefixed to lines outside the grammar so they pass through the
/// structured reader untouched.
pub(crate) const OPAQUE_ESCAPE: &str = "#!#";

/// Default in-band stand-in for "option present, no value".
pub const DEFAULT_SENTINEL: &str = "<>";

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\w+\]").expect("static pattern"))
}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w-]+\s*=").expect("static pattern"))
}

fn bare_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[\w-]+\s*$").expect("static pattern"))
}

pub(crate) fn is_section(line: &str) -> bool {
    section_re().is_match(line)
}

pub(crate) fn is_bare_key(line: &str) -> bool {
    bare_key_re().is_match(line)
}

/// Rewrite one raw line into the cleaned grammar.
pub(crate) fn clean_line(line: &str, sentinel: &str) -> String {
    if line.starts_with('#') || is_section(line) || key_value_re().is_match(line) {
        line.to_string()
    } else if line.trim().is_empty() {
        line.to_string()
    } else if is_bare_key(line) {
        format!("{line} = {sentinel}")
    } else {
        format!("{OPAQUE_ESCAPE}{line}")
    }
}

/// Reverse [`clean_line`] on one cleaned line.
pub(crate) fn unclean_line(line: &str, sentinel: &str) -> String {
    if let Some(rest) = line.strip_prefix(OPAQUE_ESCAPE) {
        return rest.to_string();
    }
    let suffix = format!(" = {sentinel}");
    match line.strip_suffix(suffix.as_str()) {
        Some(prefix) if is_bare_key(prefix) => prefix.to_string(),
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(line: &str) -> String {
        unclean_line(&clean_line(line, DEFAULT_SENTINEL), DEFAULT_SENTINEL)
    }

    #[test]
    fn test_grammar_lines_pass_through() {
        for line in ["# a comment", "[mysqld1]", "user = mysql", "key=value"] {
            assert_eq!(clean_line(line, DEFAULT_SENTINEL), line);
        }
    }

    #[test]
    fn test_bare_key_gains_and_loses_the_sentinel() {
        assert_eq!(
            clean_line("slave-skip-start", DEFAULT_SENTINEL),
            "slave-skip-start = <>"
        );
        assert_eq!(round_trip("slave-skip-start"), "slave-skip-start");
    }

    #[test]
    fn test_bare_key_whitespace_survives() {
        assert_eq!(round_trip("  indented-key  "), "  indented-key  ");
    }

    #[test]
    fn test_unparseable_line_is_escaped_and_recovered() {
        assert_eq!(
            clean_line("!include /etc/mysql/extra.cnf", DEFAULT_SENTINEL),
            "#!#!include /etc/mysql/extra.cnf"
        );
        assert_eq!(
            round_trip("!include /etc/mysql/extra.cnf"),
            "!include /etc/mysql/extra.cnf"
        );
    }

    #[test]
    fn test_blank_lines_pass_through() {
        assert_eq!(round_trip(""), "");
        assert_eq!(round_trip("   "), "   ");
    }

    #[test]
    fn test_custom_sentinel() {
        assert_eq!(clean_line("quiet", "@none@"), "quiet = @none@");
        assert_eq!(unclean_line("quiet = @none@", "@none@"), "quiet");
    }
}
