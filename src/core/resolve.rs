// Header-to-field resolution; runs once per decode on the first row.
// Bindings follow field declaration order, not header order.
// Annotated fields whose column is absent are skipped, never an error.
use std::collections::HashMap;

use tracing::debug;

use crate::core::schema::{FieldPath, Schema};

/// Which index a repeated header name resolves to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DuplicateHeaders {
    #[default]
    FirstWins,
    LastWins,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding {
    column: String,
    index: usize,
    path: FieldPath,
}

impl Binding {
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Cell index in every row of the current input.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> FieldPath {
        self.path
    }
}

pub fn resolve_bindings<'h, R>(
    headers: impl IntoIterator<Item = &'h str>,
    schema: &Schema<R>,
    duplicates: DuplicateHeaders,
) -> Vec<Binding> {
    let mut lookup: HashMap<&str, usize> = HashMap::new();
    for (index, name) in headers.into_iter().enumerate() {
        match duplicates {
            DuplicateHeaders::FirstWins => {
                lookup.entry(name).or_insert(index);
            }
            DuplicateHeaders::LastWins => {
                lookup.insert(name, index);
            }
        }
    }

    let mut bindings = Vec::new();
    for (path, field) in schema.iter() {
        let Some(column) = field.column() else {
            continue;
        };
        match lookup.get(column) {
            Some(&index) => bindings.push(Binding {
                column: column.to_string(),
                index,
                path,
            }),
            None => debug!(
                record = schema.record_name(),
                field = field.name(),
                column,
                "annotated column not present in header row"
            ),
        }
    }

    debug!(
        record = schema.record_name(),
        headers = lookup.len(),
        bindings = bindings.len(),
        "resolved column bindings"
    );
    bindings
}
