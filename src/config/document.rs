//! In-memory model of a sectioned key/value configuration file.

use super::errors::{ConfigError, ConfigResult};
use super::transform::{clean_line, unclean_line, DEFAULT_SENTINEL, OPAQUE_ESCAPE};

/// What one cleaned line means.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Comment,
    Section { name: String },
    KeyValue { key: String, value: String },
    Blank,
    Opaque,
}

/// One line of the document: its meaning plus its cleaned text. The text is
/// kept verbatim so untouched lines render back byte-identically.
#[derive(Debug, Clone)]
struct Line {
    kind: LineKind,
    text: String,
}

/// An ordered, loss-free model of a configuration file.
///
/// `get`/`set`/`remove` operate against one active section chosen at load
/// time. Everything outside that section — other sections, comments, blank
/// lines, lines the grammar does not cover — is carried through unchanged.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    lines: Vec<Line>,
    section: String,
    sentinel: String,
    trailing_newline: bool,
}

impl ConfigDocument {
    /// Parse a file's text, scoping edits to `section`.
    pub fn parse(input: &str, section: &str) -> Self {
        Self::parse_with_sentinel(input, section, DEFAULT_SENTINEL)
    }

    /// Parse with a custom "no value" sentinel.
    ///
    /// The sentinel is reserved: an option whose value literally equals it
    /// reads back as "no value".
    pub fn parse_with_sentinel(input: &str, section: &str, sentinel: &str) -> Self {
        let lines = input
            .lines()
            .map(|raw| {
                let text = clean_line(raw, sentinel);
                let kind = classify(&text);
                Line { kind, text }
            })
            .collect();
        Self {
            lines,
            section: section.to_string(),
            sentinel: sentinel.to_string(),
            trailing_newline: input.ends_with('\n'),
        }
    }

    /// An empty document scoped to `section`.
    pub fn empty(section: &str) -> Self {
        Self {
            lines: Vec::new(),
            section: section.to_string(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            trailing_newline: true,
        }
    }

    /// The active section.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Render the document back to file text, reversing the clean
    /// transform. A file without a trailing newline does not gain one.
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self
            .lines
            .iter()
            .map(|line| unclean_line(&line.text, &self.sentinel))
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    /// Read an option from the active section.
    ///
    /// `Ok(None)` means the option is present without a value — distinct
    /// from `Ok(Some(""))`, an option set to the empty string. An absent
    /// option is [`ConfigError::OptionNotFound`].
    pub fn get(&self, option: &str) -> ConfigResult<Option<&str>> {
        let index = self.find(option).ok_or_else(|| ConfigError::OptionNotFound {
            option: option.to_string(),
        })?;
        match &self.lines[index].kind {
            LineKind::KeyValue { value, .. } if *value == self.sentinel => Ok(None),
            LineKind::KeyValue { value, .. } => Ok(Some(value.as_str())),
            _ => Err(ConfigError::OptionNotFound {
                option: option.to_string(),
            }),
        }
    }

    /// Write an option in the active section, creating it (and the section)
    /// if absent. `None` stores the option without a value.
    pub fn set(&mut self, option: &str, value: Option<&str>) {
        let stored = value.unwrap_or(self.sentinel.as_str()).to_string();
        let line = Line {
            text: format!("{option} = {stored}"),
            kind: LineKind::KeyValue {
                key: option.to_string(),
                value: stored,
            },
        };
        if let Some(index) = self.find(option) {
            self.lines[index] = line;
        } else if let Some((_, end)) = self.bounds() {
            self.lines.insert(end, line);
        } else {
            let header = format!("[{}]", self.section);
            self.lines.push(Line {
                kind: classify(&header),
                text: header,
            });
            self.lines.push(line);
        }
    }

    /// Delete an option from the active section entirely.
    pub fn remove(&mut self, option: &str) -> ConfigResult<()> {
        let index = self.find(option).ok_or_else(|| ConfigError::OptionNotFound {
            option: option.to_string(),
        })?;
        self.lines.remove(index);
        Ok(())
    }

    /// Line range of the active section, exclusive of its header.
    fn bounds(&self) -> Option<(usize, usize)> {
        let start = self.lines.iter().position(|line| {
            matches!(&line.kind, LineKind::Section { name } if name == &self.section)
        })? + 1;
        let end = self.lines[start..]
            .iter()
            .position(|line| matches!(line.kind, LineKind::Section { .. }))
            .map(|offset| start + offset)
            .unwrap_or(self.lines.len());
        Some((start, end))
    }

    fn find(&self, option: &str) -> Option<usize> {
        let (start, end) = self.bounds()?;
        self.lines[start..end]
            .iter()
            .position(|line| matches!(&line.kind, LineKind::KeyValue { key, .. } if key == option))
            .map(|offset| start + offset)
    }
}

fn classify(text: &str) -> LineKind {
    use std::sync::OnceLock;

    use regex::Regex;

    static SECTION: OnceLock<Regex> = OnceLock::new();
    static KEY_VALUE: OnceLock<Regex> = OnceLock::new();
    let section = SECTION.get_or_init(|| Regex::new(r"^\[(\w+)\]").expect("static pattern"));
    let key_value = KEY_VALUE
        .get_or_init(|| Regex::new(r"^\s*([\w-]+)\s*=\s*(.*)$").expect("static pattern"));

    if text.starts_with(OPAQUE_ESCAPE) {
        LineKind::Opaque
    } else if text.starts_with('#') {
        LineKind::Comment
    } else if text.trim().is_empty() {
        LineKind::Blank
    } else if let Some(captures) = section.captures(text) {
        LineKind::Section {
            name: captures[1].to_string(),
        }
    } else if let Some(captures) = key_value.captures(text) {
        LineKind::KeyValue {
            key: captures[1].to_string(),
            value: captures[2].trim_end().to_string(),
        }
    } else {
        LineKind::Opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
# Managed by herd
[mysqld1]
user = mysql
log-bin = /var/log/mysql/master-bin
slave-skip-start

[mysqld2]
user = mysql
";

    #[test]
    fn test_untouched_document_renders_identically() {
        let doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        assert_eq!(doc.render(), FIXTURE);
    }

    #[test]
    fn test_no_trailing_newline_is_not_introduced() {
        let input = "[mysqld]\nuser = mysql";
        let doc = ConfigDocument::parse(input, "mysqld");
        assert_eq!(doc.render(), input);
    }

    #[test]
    fn test_get_reads_only_the_active_section() {
        let doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        assert_eq!(doc.get("user").unwrap(), Some("mysql"));
        assert_eq!(
            doc.get("log-bin").unwrap(),
            Some("/var/log/mysql/master-bin")
        );

        let other = ConfigDocument::parse(FIXTURE, "mysqld2");
        assert!(matches!(
            other.get("log-bin"),
            Err(ConfigError::OptionNotFound { .. })
        ));
    }

    #[test]
    fn test_valueless_option_is_none_not_empty() {
        let doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        assert_eq!(doc.get("slave-skip-start").unwrap(), None);

        let mut doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        doc.set("init-file", Some(""));
        assert_eq!(doc.get("init-file").unwrap(), Some(""));
    }

    #[test]
    fn test_set_updates_in_place_and_appends_new_keys() {
        let mut doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        doc.set("user", Some("replication"));
        doc.set("server-id", Some("7"));
        assert_eq!(doc.get("user").unwrap(), Some("replication"));
        assert_eq!(doc.get("server-id").unwrap(), Some("7"));
        // The other section is untouched.
        let rendered = doc.render();
        let other = ConfigDocument::parse(&rendered, "mysqld2");
        assert_eq!(other.get("user").unwrap(), Some("mysql"));
    }

    #[test]
    fn test_set_valueless_survives_a_full_cycle() {
        let mut doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        doc.set("log-slave-updates", None);
        let rendered = doc.render();
        assert!(rendered.contains("\nlog-slave-updates\n"));

        let again = ConfigDocument::parse(&rendered, "mysqld1");
        assert_eq!(again.get("log-slave-updates").unwrap(), None);
    }

    #[test]
    fn test_remove_deletes_and_missing_remove_fails() {
        let mut doc = ConfigDocument::parse(FIXTURE, "mysqld1");
        doc.remove("log-bin").unwrap();
        assert!(matches!(
            doc.get("log-bin"),
            Err(ConfigError::OptionNotFound { .. })
        ));
        assert!(matches!(
            doc.remove("log-bin"),
            Err(ConfigError::OptionNotFound { .. })
        ));
    }

    #[test]
    fn test_set_on_missing_section_creates_it() {
        let mut doc = ConfigDocument::empty("mysqld");
        doc.set("server-id", Some("3"));
        assert_eq!(doc.render(), "[mysqld]\nserver-id = 3\n");
    }

    #[test]
    fn test_literal_sentinel_value_collapses_to_no_value() {
        // Reserved-sentinel limitation: a value that literally equals the
        // sentinel cannot be told apart from "no value".
        let input = "[mysqld]\nstrange = <>\n";
        let doc = ConfigDocument::parse(input, "mysqld");
        assert_eq!(doc.get("strange").unwrap(), None);
        assert_eq!(doc.render(), "[mysqld]\nstrange\n");
    }

    #[test]
    fn test_unparseable_lines_survive_edits_elsewhere() {
        let input = "[mysqld]\n!include /etc/mysql/extra.cnf\nuser = mysql\n";
        let mut doc = ConfigDocument::parse(input, "mysqld");
        doc.set("user", Some("other"));
        assert_eq!(
            doc.render(),
            "[mysqld]\n!include /etc/mysql/extra.cnf\nuser = other\n"
        );
    }
}
