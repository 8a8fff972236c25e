//! A newtype over the numeric collation id MySQL uses to tag string values.
//!
//! Collation ids are an open, server-defined set (`utf8mb4_general_ci` is
//! `45`, `utf8mb4_0900_ai_ci` is `255`, and so on); this crate does not ship a
//! name-to-id table, it just carries whatever id the caller already knows.

/// A MySQL collation id. `Collation::UNSPECIFIED` (`0`) means "let the server
/// pick", and is the default used by the plain `&str`/`String` value impls —
/// it is omitted from the wire entirely rather than sent as an explicit `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Collation(pub u64);

impl Collation {
    pub const UNSPECIFIED: Collation = Collation(0);

    pub const fn new(id: u64) -> Self {
        Collation(id)
    }
}

impl From<u64> for Collation {
    fn from(id: u64) -> Self {
        Collation(id)
    }
}

/// A string value carrying an explicit collation, for callers who need
/// something other than the server default. Plain `&str`/`String` values
/// always encode with [`Collation::UNSPECIFIED`]; wrap in this type to pick a
/// specific one.
#[derive(Debug, Clone)]
pub struct CollatedStr<'a> {
    pub value: &'a str,
    pub collation: Collation,
}

impl<'a> CollatedStr<'a> {
    pub fn new(value: &'a str, collation: impl Into<Collation>) -> Self {
        CollatedStr { value, collation: collation.into() }
    }
}

impl crate::value::AppendAny for CollatedStr<'_> {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), crate::error::Error> {
        crate::proto::any::append_string(buf, tag, self.value, self.collation.0);
        Ok(())
    }
}

impl crate::value::AppendExpr for CollatedStr<'_> {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), crate::error::Error> {
        crate::proto::expr::append_string(buf, tag, self.value, self.collation.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_collation_is_zero() {
        assert_eq!(Collation::UNSPECIFIED, Collation(0));
        assert_eq!(Collation::default(), Collation::UNSPECIFIED);
    }
}
