// Field metadata tables describing how a record type binds to CSV columns.
// A table is built once per decode run and shared by every row.
// Field order in the table is declaration order; bindings inherit it.
use std::any::type_name;
use std::error::Error as StdError;
use std::fmt;

use crate::core::capability::{Slot, UnmarshalCsv};
use crate::core::shape::TypeShape;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

type TextAccessor<R> = Box<dyn Fn(&mut R) -> &mut String + Send + Sync>;
type CustomSetter<R> = Box<dyn Fn(&mut R, &str) -> Result<(), BoxError> + Send + Sync>;

/// A record type that can be decoded from named CSV columns.
///
/// Implementations are usually written with [`impl_record!`](crate::impl_record).
pub trait Record: Default + Sized + 'static {
    fn schema() -> Schema<Self>;

    fn shape() -> TypeShape {
        TypeShape::Record(type_name::<Self>())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldTag {
    Text,
    Custom,
    Unsupported,
}

pub enum FieldKind<R> {
    /// Plain `String` field; receives the cell verbatim.
    Text(TextAccessor<R>),
    /// Reference field whose referent implements `UnmarshalCsv`.
    Custom(CustomSetter<R>),
    /// Any other field type. Binding one is an error at decode time.
    Unsupported { type_name: &'static str },
}

impl<R> FieldKind<R> {
    pub fn tag(&self) -> FieldTag {
        match self {
            FieldKind::Text(_) => FieldTag::Text,
            FieldKind::Custom(_) => FieldTag::Custom,
            FieldKind::Unsupported { .. } => FieldTag::Unsupported,
        }
    }
}

impl<R> fmt::Debug for FieldKind<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Unsupported { type_name } => f
                .debug_struct("Unsupported")
                .field("type_name", type_name)
                .finish(),
            other => write!(f, "{:?}", other.tag()),
        }
    }
}

/// Position of a field within its record's table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FieldPath(usize);

impl FieldPath {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct FieldDescriptor<R> {
    name: String,
    column: Option<String>,
    kind: FieldKind<R>,
}

impl<R> FieldDescriptor<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column annotation; `None` keeps the field out of decoding.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn kind(&self) -> &FieldKind<R> {
        &self.kind
    }
}

#[derive(Debug)]
pub struct Schema<R> {
    record: &'static str,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> Schema<R> {
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder {
            schema: Schema {
                record: type_name::<R>(),
                fields: Vec::new(),
            },
        }
    }

    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    pub fn field(&self, path: FieldPath) -> Option<&FieldDescriptor<R>> {
        self.fields.get(path.0)
    }

    /// Fields in declaration order, paired with their paths.
    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, &FieldDescriptor<R>)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| (FieldPath(index), field))
    }
}

pub struct SchemaBuilder<R> {
    schema: Schema<R>,
}

impl<R: 'static> SchemaBuilder<R> {
    pub fn text<F>(self, name: &str, column: Option<&str>, accessor: F) -> Self
    where
        F: Fn(&mut R) -> &mut String + Send + Sync + 'static,
    {
        self.push(name, column, FieldKind::Text(Box::new(accessor)))
    }

    pub fn custom<S, F>(self, name: &str, column: Option<&str>, accessor: F) -> Self
    where
        S: Slot + 'static,
        F: Fn(&mut R) -> &mut S + Send + Sync + 'static,
    {
        let setter = move |record: &mut R, raw: &str| -> Result<(), BoxError> {
            accessor(record)
                .attach()
                .unmarshal_csv(raw)
                .map_err(BoxError::from)
        };
        self.push(name, column, FieldKind::Custom(Box::new(setter)))
    }

    /// Declares a field whose type `T` has no text conversion.
    pub fn other<T: ?Sized>(self, name: &str, column: Option<&str>) -> Self {
        self.push(
            name,
            column,
            FieldKind::Unsupported {
                type_name: type_name::<T>(),
            },
        )
    }

    pub fn build(self) -> Schema<R> {
        self.schema
    }

    fn push(mut self, name: &str, column: Option<&str>, kind: FieldKind<R>) -> Self {
        self.schema.fields.push(FieldDescriptor {
            name: name.to_string(),
            column: column.map(str::to_string),
            kind,
        });
        self
    }
}

/// Implements [`Record`] and value-shaped [`Element`] for a struct from a
/// compact field table.
///
/// Each entry is `field: kind [= "Column"]`, where kind is `text`, `custom`,
/// or `other(Type)`. Entries without a column stay at their default value.
///
/// ```
/// use advcsv::api::Parsed;
///
/// #[derive(Debug, Default)]
/// struct Post {
///     title: String,
///     score: Option<Parsed<i64>>,
///     notes: String,
/// }
///
/// advcsv::impl_record!(Post {
///     title: text = "Title",
///     score: custom = "Score",
///     notes: text,
/// });
///
/// let mut posts: Vec<Post> = Vec::new();
/// advcsv::api::decode("Title,Score\nHello,7\n".as_bytes(), &mut posts).unwrap();
/// assert_eq!(posts[0].title, "Hello");
/// assert_eq!(posts[0].score.map(Parsed::into_inner), Some(7));
/// ```
///
/// [`Element`]: crate::api::Element
#[macro_export]
macro_rules! impl_record {
    (@column) => {
        ::core::option::Option::None
    };
    (@column $column:literal) => {
        ::core::option::Option::Some($column)
    };
    (@field $schema:ident, $field:ident, text, $column:expr) => {
        $schema.text(::core::stringify!($field), $column, |record| &mut record.$field)
    };
    (@field $schema:ident, $field:ident, custom, $column:expr) => {
        $schema.custom(::core::stringify!($field), $column, |record| &mut record.$field)
    };
    (@field $schema:ident, $field:ident, other($ty:ty), $column:expr) => {
        $schema.other::<$ty>(::core::stringify!($field), $column)
    };
    ($record:ident { $($field:ident : $kind:ident $(($ty:ty))? $(= $column:literal)?),* $(,)? }) => {
        impl $crate::api::Record for $record {
            fn schema() -> $crate::api::Schema<Self> {
                let schema = $crate::api::Schema::<Self>::builder();
                $(
                    let schema = $crate::impl_record!(
                        @field schema,
                        $field,
                        $kind $(($ty))?,
                        $crate::impl_record!(@column $($column)?)
                    );
                )*
                schema.build()
            }
        }

        impl $crate::api::Element for $record {
            type Record = Self;

            fn shape() -> $crate::api::TypeShape {
                <Self as $crate::api::Record>::shape()
            }

            fn from_record(record: Self) -> Self {
                record
            }
        }
    };
}
