//! Gettext .po file parser.
//!
//! Parses .po format files into (source, translation, context) entries.

/// A parsed .po entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoEntry {
    pub source: String,
    pub translation: String,
    pub context: String,
}

#[derive(Clone, Copy)]
enum Field {
    Context,
    Id,
    Str,
}

#[derive(Default)]
struct Pending {
    context: String,
    msgid: String,
    msgstr: String,
}

impl Pending {
    /// Emit the entry if complete; untranslated and header entries are dropped.
    fn flush(&mut self, entries: &mut Vec<PoEntry>) {
        let pending = std::mem::take(self);
        if !pending.msgid.is_empty() && !pending.msgstr.is_empty() {
            entries.push(PoEntry {
                source: pending.msgid,
                translation: pending.msgstr,
                context: pending.context,
            });
        }
    }
}

/// Parse .po file contents into entries.
///
/// Handles multiline strings, msgctxt, msgid, and msgstr directives.
pub fn parse_po(content: &str) -> Vec<PoEntry> {
    let mut entries = Vec::new();
    let mut pending = Pending::default();
    let mut current: Option<Field> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with('#') {
            continue;
        }

        if line.is_empty() {
            pending.flush(&mut entries);
            current = None;
            continue;
        }

        if let Some(rest) = line.strip_prefix("msgctxt ") {
            // A new msgctxt after a complete pair starts the next entry
            if !pending.msgstr.is_empty() {
                pending.flush(&mut entries);
            }
            pending.context = unquote(rest);
            current = Some(Field::Context);
        } else if let Some(rest) = line.strip_prefix("msgid ") {
            if !pending.msgstr.is_empty() {
                pending.flush(&mut entries);
            }
            pending.msgid = unquote(rest);
            current = Some(Field::Id);
        } else if let Some(rest) = line.strip_prefix("msgstr ") {
            pending.msgstr = unquote(rest);
            current = Some(Field::Str);
        } else if line.starts_with('"') {
            let continued = unquote(line);
            match current {
                Some(Field::Context) => pending.context.push_str(&continued),
                Some(Field::Id) => pending.msgid.push_str(&continued),
                Some(Field::Str) => pending.msgstr.push_str(&continued),
                None => {}
            }
        }
    }

    pending.flush(&mut entries);
    entries
}

/// Remove surrounding quotes and unescape basic sequences in a single pass.
fn unquote(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}
