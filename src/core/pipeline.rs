// Decode driver: validate destination, read header, resolve, then decode rows.
// Single pass over the input; the first failure ends the run.
// Tokenizing is delegated to the `csv` crate configured from `DecodeOptions`,
// reading through a lazy-quote rewrite of the input.
use std::io::Read;

use csv::StringRecord;
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::lazy_quote::LazyQuotes;
use crate::core::record::decode_record;
use crate::core::resolve::{resolve_bindings, DuplicateHeaders};
use crate::core::schema::{Record, Schema};
use crate::core::shape::{validate_destination, Element, TypeShape};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
    /// Accept rows whose cell count differs from the header row.
    pub flexible: bool,
    pub duplicate_headers: DuplicateHeaders,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            comment: Some(b'#'),
            flexible: false,
            duplicate_headers: DuplicateHeaders::FirstWins,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    pub fn with_duplicate_headers(mut self, duplicate_headers: DuplicateHeaders) -> Self {
        self.duplicate_headers = duplicate_headers;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes every data row of `input` and appends the records to `dest`.
    pub fn decode<I, E>(&self, input: I, dest: &mut Vec<E>) -> Result<(), Error>
    where
        I: Read,
        E: Element,
        E::Record: Record,
    {
        let schema = <E::Record as Record>::schema();
        self.decode_with_schema(input, &schema, dest)
    }

    /// Like [`Decoder::decode`], with a caller-built field table.
    pub fn decode_with_schema<I, E>(
        &self,
        input: I,
        schema: &Schema<E::Record>,
        dest: &mut Vec<E>,
    ) -> Result<(), Error>
    where
        I: Read,
        E: Element,
    {
        let element = validate_destination(&TypeShape::destination::<E>())?;

        let mut reader = self.reader(input);
        let mut row = StringRecord::new();
        if !read_row(&mut reader, &mut row)? {
            return Err(Error::new(ErrorKind::Read).with_message("input has no header row"));
        }
        let bindings = resolve_bindings(row.iter(), schema, self.options.duplicate_headers);

        let start = dest.len();
        while read_row(&mut reader, &mut row)? {
            dest.push(decode_record(&row, schema, &bindings)?);
        }

        debug!(
            record = schema.record_name(),
            ?element,
            rows = dest.len() - start,
            "decoded input"
        );
        Ok(())
    }

    fn reader<I: Read>(&self, input: I) -> csv::Reader<LazyQuotes<I>> {
        let input = LazyQuotes::new(
            input,
            self.options.delimiter,
            self.options.quote,
            self.options.comment,
        );
        csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .comment(self.options.comment)
            .flexible(self.options.flexible)
            .from_reader(input)
    }
}

/// Decodes `input` with default options into `dest`.
pub fn decode<I, E>(input: I, dest: &mut Vec<E>) -> Result<(), Error>
where
    I: Read,
    E: Element,
    E::Record: Record,
{
    Decoder::default().decode(input, dest)
}

/// Reads the header row only.
pub fn read_headers<I: Read>(input: I, options: &DecodeOptions) -> Result<Vec<String>, Error> {
    let mut reader = Decoder::new(*options).reader(input);
    let mut row = StringRecord::new();
    if !read_row(&mut reader, &mut row)? {
        return Err(Error::new(ErrorKind::Read).with_message("input has no header row"));
    }
    Ok(row.iter().map(str::to_string).collect())
}

fn read_row<R: Read>(reader: &mut csv::Reader<R>, row: &mut StringRecord) -> Result<bool, Error> {
    reader.read_record(row).map_err(read_error)
}

fn read_error(err: csv::Error) -> Error {
    let line = err.position().map(|position| position.line());
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("row has {len} cells, expected {expected_len}"),
        csv::ErrorKind::Utf8 { .. } => "row is not valid UTF-8".to_string(),
        csv::ErrorKind::Io(_) => "failed to read input".to_string(),
        _ => "malformed row".to_string(),
    };
    let mut error = Error::new(ErrorKind::Read).with_message(message);
    if let Some(line) = line {
        error = error.with_line(line);
    }
    error.with_source(err)
}
