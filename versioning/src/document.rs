//! Line preserving model of a properties file.
//!
//! The file is kept as the list of its raw lines. Lines holding one of the
//! keys this crate manages are tagged with the key and parsed value; every
//! other line (comments, blanks, unrelated keys) is carried through
//! untouched, so rewriting one entry never disturbs the rest of the file.

/// Keys managed in the version file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Version,
    NotableVersions,
}

impl Key {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Key::Version => "version",
            Key::NotableVersions => "notableVersions",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "version" => Some(Key::Version),
            "notableVersions" => Some(Key::NotableVersions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: Key,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    raw: String,
    entry: Option<Entry>,
}

impl Line {
    fn parse(raw: &str) -> Self {
        Line {
            raw: raw.to_owned(),
            entry: parse_entry(raw),
        }
    }

    fn entry(key: Key, value: &str) -> Self {
        Line {
            raw: format!("{}={}", key.name(), value),
            entry: Some(Entry {
                key,
                value: value.to_owned(),
            }),
        }
    }

    fn is(&self, key: Key) -> bool {
        self.entry.as_ref().is_some_and(|entry| entry.key == key)
    }
}

/// Split a `key=value` (or `key: value`) line. Comments start with `#` or `!`.
fn parse_entry(raw: &str) -> Option<Entry> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let (key, value) = line.split_once(['=', ':'])?;
    let key = Key::from_name(key.trim())?;
    Some(Entry {
        key,
        value: value.trim().to_owned(),
    })
}

/// A properties file as an ordered list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertiesFile {
    lines: Vec<Line>,
}

impl PropertiesFile {
    pub(crate) fn parse(content: &str) -> Self {
        let content = content.strip_suffix('\n').unwrap_or(content);
        let lines = if content.is_empty() {
            Vec::new()
        } else {
            content.split('\n').map(Line::parse).collect()
        };
        PropertiesFile { lines }
    }

    /// Value of the last line holding `key`, the way later definitions
    /// override earlier ones in properties files.
    pub(crate) fn value(&self, key: Key) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .filter_map(|line| line.entry.as_ref())
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Rewrite every line holding `key`. Returns `false` if there was none.
    pub(crate) fn replace(&mut self, key: Key, value: &str) -> bool {
        let mut replaced = false;
        for line in self.lines.iter_mut().filter(|line| line.is(key)) {
            *line = Line::entry(key, value);
            replaced = true;
        }
        replaced
    }

    /// Add an entry at the end of the file, separated by a blank line.
    pub(crate) fn append(&mut self, key: Key, value: &str) {
        if !self.lines.is_empty() {
            self.lines.push(Line::parse(""));
        }
        self.lines.push(Line::entry(key, value));
    }

    /// The file contents. Every line, the last one included, ends with `\n`.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.raw);
            out.push('\n');
        }
        out
    }
}
