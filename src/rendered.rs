//! The frozen result of a template invocation.

use std::fmt;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;

use crate::indent;
use crate::template::Template;
use crate::value::Value;

/// The result of rendering a template.
///
/// Position 0 holds the record of normalized raw segments; positions 1..N
/// hold the original, unresolved placeholder values. The resolved,
/// re-indented string form of each value is computed on first
/// stringification and memoized, so repeated stringification is idempotent
/// and cheap.
///
/// Positions and length are fixed for the life of the result. Callers may
/// still attach, read, and remove arbitrary named metadata without touching
/// the structure.
pub struct Rendered<'t> {
    template: &'t Template,
    segments: Vec<String>,
    values: Vec<Value>,
    resolved: Vec<OnceCell<String>>,
    attachments: IndexMap<String, Value>,
}

/// A positional entry of a rendered result.
#[derive(Debug)]
pub enum Entry<'r> {
    /// The raw-segments record at position 0.
    Segments(&'r [String]),
    /// A raw placeholder value at positions 1 and up.
    Value(&'r Value),
}

impl<'t> Rendered<'t> {
    pub(crate) fn new(
        template: &'t Template,
        segments: Vec<String>,
        values: Vec<Value>,
    ) -> Self {
        let resolved = (0..values.len()).map(|_| OnceCell::new()).collect();
        Self { template, segments, values, resolved, attachments: IndexMap::new() }
    }

    /// The normalized literal segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The original, unresolved placeholder values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The raw value at placeholder position `index` (0-based among the
    /// placeholders).
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The resolved, re-indented string form of the value at placeholder
    /// position `index`, computing and memoizing it if needed.
    pub fn resolved(&self, index: usize) -> Option<&str> {
        if index >= self.values.len() {
            return None;
        }
        Some(self.resolve(index))
    }

    /// Number of positional entries: the segments record plus one per
    /// placeholder.
    pub fn len(&self) -> usize {
        self.values.len() + 1
    }

    /// A rendered result always carries at least the segments record.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The positional entry at `index`, if any.
    pub fn entry(&self, index: usize) -> Option<Entry<'_>> {
        if index == 0 {
            Some(Entry::Segments(&self.segments))
        } else {
            self.values.get(index - 1).map(Entry::Value)
        }
    }

    /// Iterates the positional entries in order.
    pub fn iter(&self) -> Entries<'_, 't> {
        Entries { rendered: self, index: 0 }
    }

    /// Attaches named metadata to the result.
    pub fn attach(&mut self, name: impl Into<String>, value: Value) {
        self.attachments.insert(name.into(), value);
    }

    /// Reads previously attached metadata.
    pub fn attachment(&self, name: &str) -> Option<&Value> {
        self.attachments.get(name)
    }

    /// Removes and returns previously attached metadata.
    pub fn detach(&mut self, name: &str) -> Option<Value> {
        self.attachments.shift_remove(name)
    }

    /// Resolves value `index`, re-indented to the column its placeholder
    /// sits at.
    ///
    /// The current indent is the run of indent characters at the start of
    /// the last line of everything rendered so far, up to and including the
    /// segment preceding this value. Continuation lines of a multi-line
    /// substitution inherit that column.
    fn resolve(&self, index: usize) -> &str {
        self.resolved[index].get_or_init(|| {
            let mut line = String::new();
            for i in 0..=index {
                if i > 0 {
                    extend_last_line(&mut line, self.resolve(i - 1));
                }
                extend_last_line(&mut line, &self.segments[i]);
            }
            let current = indent::leading_indent(&line, self.template.indent());

            let text = self.template.resolve(&self.values[index]);
            if current.is_empty() {
                text
            } else {
                text.replace('\n', &format!("\n{current}"))
            }
        })
    }
}

/// Tracks the last line of the output assembled so far.
fn extend_last_line(line: &mut String, chunk: &str) {
    match chunk.rfind('\n') {
        Some(pos) => {
            line.clear();
            line.push_str(&chunk[pos + 1..]);
        }
        None => line.push_str(chunk),
    }
}

impl fmt::Debug for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("segments", &self.segments)
            .field("values", &self.values)
            .finish()
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments[0])?;
        for index in 0..self.values.len() {
            f.write_str(self.resolve(index))?;
            f.write_str(&self.segments[index + 1])?;
        }
        Ok(())
    }
}

/// Iterator over the positional entries of a [`Rendered`] result.
pub struct Entries<'r, 't> {
    rendered: &'r Rendered<'t>,
    index: usize,
}

impl<'r> Iterator for Entries<'r, '_> {
    type Item = Entry<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.rendered.entry(self.index)?;
        self.index += 1;
        Some(entry)
    }
}

impl<'r, 't> IntoIterator for &'r Rendered<'t> {
    type Item = Entry<'r>;
    type IntoIter = Entries<'r, 't>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
