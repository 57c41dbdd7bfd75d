//! Purpose: Runtime-built record type for ad-hoc column projection in the CLI.
//! Exports: `ColumnSpec`, `Projection`, `ProjectedRow`.
//! Role: Lets `advcsv project` reuse the library pipeline without a compiled record type.
//! Invariants: Output keys follow the `--column` specs; absent columns are omitted.
//! Invariants: Cell text is emitted verbatim as JSON strings.
use std::any::type_name;
use std::collections::BTreeMap;
use std::str::FromStr;

use advcsv::api::{Element, Error, ErrorKind, Schema, TypeShape};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ColumnSpec {
    pub column: String,
    pub key: String,
}

impl FromStr for ColumnSpec {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (column, key) = match spec.split_once('=') {
            Some((column, key)) => (column, key),
            None => (spec, spec),
        };
        if column.is_empty() || key.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid column spec {spec:?}; expected NAME or NAME=KEY")));
        }
        Ok(Self {
            column: column.to_string(),
            key: key.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct ProjectedRow {
    cells: BTreeMap<usize, String>,
}

impl Element for ProjectedRow {
    type Record = Self;

    fn shape() -> TypeShape {
        TypeShape::Record(type_name::<Self>())
    }

    fn from_record(record: Self) -> Self {
        record
    }
}

pub(crate) struct Projection {
    specs: Vec<ColumnSpec>,
}

impl Projection {
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, Error> {
        let specs = specs
            .iter()
            .map(|spec| spec.as_ref().parse())
            .collect::<Result<Vec<ColumnSpec>, Error>>()?;
        Ok(Self { specs })
    }

    pub fn schema(&self) -> Schema<ProjectedRow> {
        self.specs
            .iter()
            .enumerate()
            .fold(Schema::<ProjectedRow>::builder(), |schema, (index, spec)| {
                schema.text(&spec.key, Some(spec.column.as_str()), move |row| {
                    row.cells.entry(index).or_default()
                })
            })
            .build()
    }

    pub fn to_json(&self, row: &ProjectedRow) -> Value {
        let mut object = Map::new();
        for (index, cell) in &row.cells {
            if let Some(spec) = self.specs.get(*index) {
                object.insert(spec.key.clone(), Value::String(cell.clone()));
            }
        }
        Value::Object(object)
    }
}
