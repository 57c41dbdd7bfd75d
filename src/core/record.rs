// Per-row decoding: one fresh record per data row, filled through bindings.
// Any failure aborts the row; partial records never reach the destination.
use csv::StringRecord;
use tracing::trace;

use crate::core::error::{Error, ErrorKind};
use crate::core::resolve::Binding;
use crate::core::schema::{FieldKind, Schema};
use crate::core::shape::Element;

pub fn decode_record<E: Element>(
    row: &StringRecord,
    schema: &Schema<E::Record>,
    bindings: &[Binding],
) -> Result<E, Error> {
    let line = row.position().map(|position| position.line());
    let with_line = |err: Error| match line {
        Some(line) => err.with_line(line),
        None => err,
    };

    let mut record = <E::Record as Default>::default();
    for binding in bindings {
        let field = schema.field(binding.path()).ok_or_else(|| {
            Error::new(ErrorKind::Internal)
                .with_message("binding refers to a field outside the record table")
                .with_column(binding.column())
        })?;
        let raw = row.get(binding.index()).ok_or_else(|| {
            with_line(
                Error::new(ErrorKind::Read)
                    .with_message(format!(
                        "row has {} cells, column index {} is missing",
                        row.len(),
                        binding.index()
                    ))
                    .with_field(field.name())
                    .with_column(binding.column()),
            )
        })?;

        match field.kind() {
            FieldKind::Custom(convert) => {
                convert(&mut record, raw).map_err(|source| {
                    with_line(
                        Error::new(ErrorKind::Conversion)
                            .with_message("custom conversion rejected cell text")
                            .with_field(field.name())
                            .with_column(binding.column())
                            .with_text(raw)
                            .with_boxed_source(source),
                    )
                })?;
            }
            FieldKind::Text(access) => {
                *access(&mut record) = raw.to_string();
            }
            FieldKind::Unsupported { type_name } => {
                return Err(with_line(
                    Error::new(ErrorKind::UnsupportedType)
                        .with_message(
                            "field type is neither String nor a custom-convertible reference",
                        )
                        .with_type(*type_name)
                        .with_field(field.name())
                        .with_column(binding.column()),
                ));
            }
        }
    }

    trace!(line = ?line, fields = bindings.len(), "decoded record");
    Ok(E::from_record(record))
}
