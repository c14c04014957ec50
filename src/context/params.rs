//! Captured path parameters.

use std::ops::Range;
use std::sync::Arc;

/// Request-scoped parameter storage.
///
/// Values live in one reusable string buffer; names are shared with the
/// matched route. Clearing keeps all capacity, so a pooled instance stops
/// allocating once it has seen its largest request.
#[derive(Debug, Default, Clone)]
pub struct Params {
    buf: String,
    entries: Vec<(Arc<str>, Range<usize>)>,
    /// Spans into the path under lookup, filled while walking the tree.
    spans: Vec<Range<usize>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, range)| &self.buf[range.clone()])
    }

    /// `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(n, range)| (n.as_ref(), &self.buf[range.clone()]))
    }

    /// Values in pattern order, suitable for positional URI building.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, range)| &self.buf[range.clone()])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.entries.clear();
        self.spans.clear();
    }

    pub(crate) fn push_span(&mut self, span: Range<usize>) {
        self.spans.push(span);
    }

    pub(crate) fn pop_span(&mut self) {
        self.spans.pop();
    }

    /// Copy the recorded spans of `path` into owned storage under `names`.
    pub(crate) fn commit(&mut self, path: &str, names: &[Arc<str>]) {
        self.buf.clear();
        self.entries.clear();
        for (name, span) in names.iter().zip(self.spans.drain(..)) {
            let start = self.buf.len();
            self.buf.push_str(&path[span]);
            self.entries.push((name.clone(), start..self.buf.len()));
        }
        self.spans.clear();
    }
}
