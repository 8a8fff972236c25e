//! The polymorphic value that can appear inside an `Any` or `Expr` envelope.
//!
//! The reference encoder takes an untyped `interface{}` and type-switches on
//! it; Rust has no such open dispatch, so the type switch becomes two traits
//! implemented for every type this crate accepts as a literal, plus a blanket
//! impl for closures so callers can build operator trees, column references,
//! and session-variable back-references the same way the reference library's
//! `AppendExprFunc`/`AppendAny` interface values do.

use crate::error::{encode_err, Error};
use crate::proto::{any, expr};

/// A value that knows how to encode itself into an `Any` envelope at a given
/// field tag — used for `StmtExecute`/`Execute` arguments.
pub trait AppendAny {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error>;
}

/// A value that knows how to encode itself into an `Expr` envelope at a given
/// field tag — used for CRUD row fields, update values, and criteria/operator
/// trees.
pub trait AppendExpr {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error>;
}

macro_rules! impl_scalar_pair {
    ($ty:ty, $any_fn:path, $expr_fn:path) => {
        impl AppendAny for $ty {
            fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
                $any_fn(buf, tag, (*self).into());
                Ok(())
            }
        }
        impl AppendExpr for $ty {
            fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
                $expr_fn(buf, tag, (*self).into());
                Ok(())
            }
        }
    };
}

impl_scalar_pair!(i8, any::append_sint, expr::append_sint);
impl_scalar_pair!(i16, any::append_sint, expr::append_sint);
impl_scalar_pair!(i32, any::append_sint, expr::append_sint);
impl_scalar_pair!(i64, any::append_sint, expr::append_sint);
impl_scalar_pair!(u8, any::append_uint, expr::append_uint);
impl_scalar_pair!(u16, any::append_uint, expr::append_uint);
impl_scalar_pair!(u32, any::append_uint, expr::append_uint);
impl_scalar_pair!(u64, any::append_uint, expr::append_uint);
impl_scalar_pair!(f32, any::append_float, expr::append_float);
impl_scalar_pair!(f64, any::append_double, expr::append_double);

impl AppendAny for bool {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        any::append_bool(buf, tag, *self);
        Ok(())
    }
}
impl AppendExpr for bool {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        expr::append_bool(buf, tag, *self);
        Ok(())
    }
}

// isize/usize round out Go's platform-width `int`/`uint`.
impl_scalar_pair!(isize, any::append_sint_isize, expr::append_sint_isize);
impl_scalar_pair!(usize, any::append_uint_usize, expr::append_uint_usize);

impl AppendAny for str {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        any::append_string(buf, tag, self, 0);
        Ok(())
    }
}
impl AppendExpr for str {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        expr::append_string(buf, tag, self, 0);
        Ok(())
    }
}
impl AppendAny for String {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        self.as_str().append_any(buf, tag)
    }
}
impl AppendExpr for String {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        self.as_str().append_expr(buf, tag)
    }
}

impl AppendAny for [u8] {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        any::append_octets(buf, tag, self);
        Ok(())
    }
}
impl AppendExpr for [u8] {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        expr::append_octets(buf, tag, self);
        Ok(())
    }
}
impl AppendAny for Vec<u8> {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        self.as_slice().append_any(buf, tag)
    }
}
impl AppendExpr for Vec<u8> {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        self.as_slice().append_expr(buf, tag)
    }
}

/// A wall-clock timestamp, formatted `YYYY-MM-DD HH:MM:SS.nnnnnnnnn`.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    pub secs_since_epoch: i64,
    pub nanos: u32,
}
impl AppendAny for Timestamp {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        any::append_timestamp(buf, tag, self.secs_since_epoch, self.nanos);
        Ok(())
    }
}
impl AppendExpr for Timestamp {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        expr::append_timestamp(buf, tag, self.secs_since_epoch, self.nanos);
        Ok(())
    }
}

/// A signed duration, formatted `[-]H:MM:SS`.
#[derive(Debug, Clone, Copy)]
pub struct Duration {
    pub total_seconds: i64,
}
impl AppendAny for Duration {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        any::append_duration(buf, tag, self.total_seconds);
        Ok(())
    }
}
impl AppendExpr for Duration {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        expr::append_duration(buf, tag, self.total_seconds);
        Ok(())
    }
}

/// `None` encodes as the SQL NULL scalar; `Some(v)` delegates to `v`. This is
/// the one case where "absent" and "default" must not be conflated with an
/// empty string/octet value, so it is a dedicated impl rather than folded
/// into the octets/string impls.
impl<T: AppendAny> AppendAny for Option<T> {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        match self {
            Some(v) => v.append_any(buf, tag),
            None => {
                any::append_null(buf, tag);
                Ok(())
            }
        }
    }
}
impl<T: AppendExpr> AppendExpr for Option<T> {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        match self {
            Some(v) => v.append_expr(buf, tag),
            None => {
                expr::append_null(buf, tag);
                Ok(())
            }
        }
    }
}

impl<T: AppendAny + ?Sized> AppendAny for &T {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        (**self).append_any(buf, tag)
    }
}
impl<T: AppendExpr + ?Sized> AppendExpr for &T {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        (**self).append_expr(buf, tag)
    }
}

impl<T: AppendAny + ?Sized> AppendAny for Box<T> {
    fn append_any(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        (**self).append_any(buf, tag)
    }
}
impl<T: AppendExpr + ?Sized> AppendExpr for Box<T> {
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        (**self).append_expr(buf, tag)
    }
}

/// Wraps a closure as an `AppendExpr`, mirroring the reference library's
/// `AppendExprFunc` type. This is how operator/function-call/column/variable
/// expression trees are composed: [`crate::expr`]'s helpers return one of
/// these rather than a concrete struct per expression shape.
pub struct ExprFn<F>(pub F)
where
    F: Fn(&mut Vec<u8>, u8) -> Result<(), Error>;

impl<F> AppendExpr for ExprFn<F>
where
    F: Fn(&mut Vec<u8>, u8) -> Result<(), Error>,
{
    fn append_expr(&self, buf: &mut Vec<u8>, tag: u8) -> Result<(), Error> {
        (self.0)(buf, tag)
    }
}

/// A boxed expression tree node, the common currency passed around
/// [`crate::expr`]'s operator/function helpers and [`crate::builder`]'s
/// CRUD methods.
pub type BoxedExpr = Box<dyn AppendExpr>;
/// A boxed `Any`-encodable argument, the common currency for
/// `StmtExecute`/`Execute` arguments.
pub type BoxedAny = Box<dyn AppendAny>;

pub(crate) fn unsupported(type_name: &str) -> Error {
    encode_err!("unsupported value type {}", type_name)
}
