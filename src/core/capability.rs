// Custom text-to-value conversion for field types that own their parsing.
// Reference fields (`Option<T>`) are the only shape eligible for dispatch.
use std::error::Error as StdError;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Conversion hook implemented by field types that parse their own cell text.
///
/// The decoder calls `unmarshal_csv` exactly once per bound cell, on a freshly
/// defaulted value, and propagates any error as a conversion failure.
pub trait UnmarshalCsv {
    type Error: StdError + Send + Sync + 'static;

    fn unmarshal_csv(&mut self, data: &str) -> Result<(), Self::Error>;
}

impl<T: UnmarshalCsv + ?Sized> UnmarshalCsv for Box<T> {
    type Error = T::Error;

    fn unmarshal_csv(&mut self, data: &str) -> Result<(), Self::Error> {
        (**self).unmarshal_csv(data)
    }
}

/// A record field that refers to a capability-backed value.
pub trait Slot {
    type Target: UnmarshalCsv;

    /// Replaces the current referent with a fresh default value and returns it.
    fn attach(&mut self) -> &mut Self::Target;
}

impl<T: UnmarshalCsv + Default> Slot for Option<T> {
    type Target = T;

    fn attach(&mut self) -> &mut T {
        self.insert(T::default())
    }
}

/// Adapts any `FromStr` type to the conversion hook.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Parsed<T>(pub T);

impl<T> Parsed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Parsed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Parsed<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> UnmarshalCsv for Parsed<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    type Error = T::Err;

    fn unmarshal_csv(&mut self, data: &str) -> Result<(), Self::Error> {
        self.0 = data.parse()?;
        Ok(())
    }
}
