//! The pipeline builder: appends a sequence of client frames into one
//! buffer, latching the first encoding error it hits rather than unwinding,
//! and offering `expect`/transaction scopes that bracket a run of
//! operations with an opening and closing frame.
//!
//! A `Builder` is a single growable buffer plus a sticky error slot. Scope
//! methods (`expect_fail_on_error`, `tx`, `insert_f`, `update_f`) take
//! `&mut self` and hand that same reborrowed reference to the supplied
//! closure — there is only ever one buffer, so "the child shares the
//! parent's buffer" falls out of ordinary Rust borrowing rather than
//! needing a separate child object copied back afterwards. The `locked`
//! flag below is not load-bearing for that reason; it exists only so a
//! reentrant scope call (which the type system already can't produce
//! through safe code) still panics, flagging the mistake the same way a
//! caller misusing these scopes would expect.

use crate::error::{encode_err, Error, Result};
use crate::proto::message::{crud, expect, prepare, sql};
use crate::proto::tags::client_message;
use crate::value::{BoxedAny, BoxedExpr};

pub use crate::proto::message::expect::{Condition, CtxOp};

/// SQL transaction isolation level, per `SET TRANSACTION ISOLATION LEVEL …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    Default,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    /// `START TRANSACTION WITH CONSISTENT SNAPSHOT` — no preceding
    /// `SET TRANSACTION ISOLATION LEVEL` statement.
    Snapshot,
}

impl Isolation {
    fn as_sql(self) -> Option<&'static str> {
        match self {
            Isolation::Default | Isolation::Snapshot => None,
            Isolation::ReadUncommitted => Some("READ UNCOMMITTED"),
            Isolation::ReadCommitted => Some("READ COMMITTED"),
            Isolation::RepeatableRead => Some("REPEATABLE READ"),
            Isolation::Serializable => Some("SERIALIZABLE"),
        }
    }
}

struct PendingInsert {
    start: usize,
    num_columns: usize,
}

/// An ordered sequence of client frames under construction. `Builder::send`
/// (via [`crate::connection::Connection`]) transmits the whole buffer in one
/// write and reads back one response per frame.
pub struct Builder {
    buf: Vec<u8>,
    error: Option<Error>,
    locked: bool,
    pending_insert: Option<PendingInsert>,
    pending_update: Option<usize>,
    var_seq: u64,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            buf: Vec::new(),
            error: None,
            locked: false,
            pending_insert: None,
            pending_update: None,
            var_seq: 0,
        }
    }

    /// The first error latched by a failed operation, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    fn latch(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn flush_pending(&mut self) {
        if let Some(p) = self.pending_insert.take() {
            crud::insert_finish(&mut self.buf, p.start);
        }
        if let Some(start) = self.pending_update.take() {
            crud::update_finish(&mut self.buf, start);
        }
    }

    /// Consumes the builder, returning its finished buffer or the sticky
    /// error without transmitting anything.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.flush_pending();
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.buf),
        }
    }

    // ---- flat operations --------------------------------------------

    pub fn stmt_execute(&mut self, stmt: &str, args: Vec<BoxedAny>) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = sql::append(&mut self.buf, stmt, &args) {
            self.latch(e);
        }
        self
    }

    pub fn prepare(&mut self, stmt_id: u32, stmt: &str) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = prepare::prepare(&mut self.buf, stmt_id, stmt) {
            self.latch(e);
        }
        self
    }

    pub fn execute(&mut self, stmt_id: u32, args: Vec<BoxedAny>) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = prepare::execute(&mut self.buf, stmt_id, &args) {
            self.latch(e);
        }
        self
    }

    pub fn deallocate(&mut self, stmt_id: u32) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        prepare::deallocate(&mut self.buf, stmt_id);
        self
    }

    /// Opens a `CRUD_INSERT` frame. Must be followed by one or more
    /// [`Builder::append_insert_row`] calls; the frame is closed by the next
    /// operation (or by [`Builder::finish`]).
    pub fn insert(&mut self, table: &str, columns: &[&str]) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        let start = crud::insert_begin(&mut self.buf, table, columns);
        self.pending_insert = Some(PendingInsert { start, num_columns: columns.len() });
        self
    }

    /// Appends one row to the insert opened by the most recent
    /// [`Builder::insert`] call. A programmer error (no pending insert) is
    /// latched as an encoding error rather than panicking, since unlike the
    /// child-lock invariant this is reachable through ordinary misuse, not
    /// only through unsafe code.
    pub fn append_insert_row(&mut self, row: Vec<BoxedExpr>) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let Some(pending) = self.pending_insert.as_ref() else {
            self.latch(encode_err!("append_insert_row called with no pending insert"));
            return self;
        };
        if let Err(e) = crud::insert_row(&mut self.buf, pending.num_columns, &row) {
            self.latch(e);
        }
        self
    }

    /// One-shot `Update`: header, optional criteria, then every `(column,
    /// value)` pair in `sets`, in one call.
    pub fn update(&mut self, table: &str, criteria: Option<BoxedExpr>, sets: Vec<(String, BoxedExpr)>) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        let criteria_ref = criteria.as_deref();
        if let Err(e) = crud::update(&mut self.buf, table, criteria_ref, &sets) {
            self.latch(e);
        }
        self
    }

    pub fn delete(&mut self, table: &str, criteria: Option<BoxedExpr>) -> &mut Self {
        self.flush_pending();
        if self.error.is_some() {
            return self;
        }
        let criteria_ref = criteria.as_deref();
        if let Err(e) = crud::delete(&mut self.buf, table, criteria_ref) {
            self.latch(e);
        }
        self
    }

    /// Appends a single-row insert and returns an `Expr` that resolves to a
    /// freshly named session variable holding `LAST_INSERT_ID()`, so a
    /// caller can chain a dependent insert without a round trip:
    /// `builder.insert_row(..).into()` used directly as another row's field
    /// or an update's value.
    pub fn insert_row(&mut self, table: &str, columns: &[&str], row: Vec<BoxedExpr>) -> BoxedExpr {
        self.insert(table, columns);
        self.append_insert_row(row);
        self.flush_pending();

        self.var_seq += 1;
        let name = format!("@xproto_id_{}_{}", self.buf.len(), self.var_seq);
        if self.error.is_none() {
            self.stmt_execute(&format!("SET {} = LAST_INSERT_ID()", name), Vec::new());
        }
        crate::expr::variable(name)
    }

    // ---- scopes --------------------------------------------------------

    /// Brackets `f` with `EXPECT_OPEN(op, conditions)` / `EXPECT_CLOSE`.
    pub fn expect_fail_on_error<F>(&mut self, op: CtxOp, conditions: &[Condition], f: F) -> Result<()>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        debug_assert!(!self.locked, "expect_fail_on_error called on a builder that is already locked");
        if self.error.is_some() {
            return Ok(());
        }
        self.flush_pending();

        expect::open(&mut self.buf, op, conditions);

        self.locked = true;
        let result = f(self);
        self.locked = false;

        self.flush_pending();
        expect::close(&mut self.buf);
        result
    }

    /// Brackets `f` with the opening transaction statement(s) for
    /// `isolation` and a trailing `COMMIT`. Never emits `ROLLBACK` — if `f`
    /// wants to abort, it returns an `Err`, which is reported to the caller
    /// but does not itself alter the buffer (see crate docs on the pipeline
    /// model).
    pub fn tx<F>(&mut self, isolation: Isolation, f: F) -> Result<()>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        debug_assert!(!self.locked, "tx called on a builder that is already locked");
        if self.error.is_some() {
            return Ok(());
        }
        self.flush_pending();

        if let Some(level) = isolation.as_sql() {
            self.stmt_execute(&format!("SET TRANSACTION ISOLATION LEVEL {}", level), Vec::new());
        }
        if isolation == Isolation::Snapshot {
            self.stmt_execute("START TRANSACTION WITH CONSISTENT SNAPSHOT", Vec::new());
        } else {
            self.stmt_execute("START TRANSACTION", Vec::new());
        }

        self.locked = true;
        let result = f(self);
        self.locked = false;

        self.flush_pending();
        self.stmt_execute("COMMIT", Vec::new());
        result
    }

    /// Opens an insert, runs `f` to append its rows via
    /// [`Builder::append_insert_row`], then closes the frame.
    pub fn insert_f<F>(&mut self, table: &str, columns: &[&str], f: F) -> Result<()>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        debug_assert!(!self.locked, "insert_f called on a builder that is already locked");
        if self.error.is_some() {
            return Ok(());
        }
        self.insert(table, columns);

        self.locked = true;
        let result = f(self);
        self.locked = false;

        self.flush_pending();
        result
    }

    /// Opens an update (header + optional criteria), runs `f` to append its
    /// `SET` operations via [`Builder::append_update_set`], then closes the
    /// frame.
    pub fn update_f<F>(&mut self, table: &str, criteria: Option<BoxedExpr>, f: F) -> Result<()>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        debug_assert!(!self.locked, "update_f called on a builder that is already locked");
        if self.error.is_some() {
            return Ok(());
        }
        self.flush_pending();

        let criteria_ref = criteria.as_deref();
        match crud::update_begin(&mut self.buf, table, criteria_ref) {
            Ok(start) => self.pending_update = Some(start),
            Err(e) => {
                self.latch(e);
                return Ok(());
            }
        }

        self.locked = true;
        let result = f(self);
        self.locked = false;

        self.flush_pending();
        result
    }

    /// Appends one `SET column = value` operation inside an [`update_f`]
    /// body.
    pub fn append_update_set(&mut self, column: &str, value: BoxedExpr) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.pending_update.is_none() {
            self.latch(encode_err!("append_update_set called with no pending update"));
            return self;
        }
        if let Err(e) = crud::update_append_set(&mut self.buf, column, value.as_ref()) {
            self.latch(e);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr;

    #[test]
    fn stmt_execute_then_finish_yields_one_frame() {
        let mut b = Builder::new();
        b.stmt_execute("SELECT 1", Vec::new());
        let buf = b.finish().unwrap();
        assert_eq!(buf[4], client_message::SQL_STMT_EXECUTE);
        let declared = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
        assert_eq!(declared, buf.len() - 4);
    }

    #[test]
    fn row_column_mismatch_latches_and_blocks_further_frames() {
        let mut b = Builder::new();
        b.insert("foo", &["id", "val"]);
        b.append_insert_row(vec![Box::new(1i64)]);
        b.stmt_execute("SELECT 1", Vec::new());
        assert!(matches!(b.error(), Some(Error::Encode(_))));
        assert!(b.finish().is_err());
    }

    #[test]
    fn tx_brackets_body_with_start_and_commit() {
        let mut b = Builder::new();
        b.tx(Isolation::Serializable, |inner| {
            inner.stmt_execute("UPDATE foo SET val = 1", Vec::new());
            Ok(())
        })
        .unwrap();
        let buf = b.finish().unwrap();

        let mut offset = 0usize;
        let mut types = Vec::new();
        while offset < buf.len() {
            let len = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
            types.push(buf[offset + 4]);
            offset += 4 + len;
        }
        // SET ISOLATION LEVEL, START TRANSACTION, UPDATE, COMMIT.
        assert_eq!(types.len(), 4);
        assert!(types.iter().all(|&t| t == client_message::SQL_STMT_EXECUTE));
    }

    #[test]
    fn snapshot_isolation_skips_the_set_isolation_statement() {
        let mut b = Builder::new();
        b.tx(Isolation::Snapshot, |_inner| Ok(())).unwrap();
        let buf = b.finish().unwrap();

        let mut offset = 0usize;
        let mut count = 0;
        while offset < buf.len() {
            let len = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
            offset += 4 + len;
            count += 1;
        }
        // START TRANSACTION WITH CONSISTENT SNAPSHOT, COMMIT.
        assert_eq!(count, 2);
    }

    #[test]
    fn insert_row_emits_insert_then_last_insert_id_assignment() {
        let mut b = Builder::new();
        let id_var = b.insert_row("parent", &["name"], vec![expr::lit("alice".to_string())]);
        b.insert("child", &["parent_id"]);
        b.append_insert_row(vec![id_var]);
        let buf = b.finish().unwrap();

        let mut offset = 0usize;
        let mut types = Vec::new();
        while offset < buf.len() {
            let len = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
            types.push(buf[offset + 4]);
            offset += 4 + len;
        }
        assert_eq!(types, vec![client_message::CRUD_INSERT, client_message::SQL_STMT_EXECUTE, client_message::CRUD_INSERT]);
    }

    #[test]
    fn expect_fail_on_error_brackets_body() {
        let mut b = Builder::new();
        b.expect_fail_on_error(CtxOp::Empty, &[Condition::NoError(true)], |inner| {
            inner.stmt_execute("SELECT 1", Vec::new());
            Ok(())
        })
        .unwrap();
        let buf = b.finish().unwrap();

        let mut offset = 0usize;
        let mut types = Vec::new();
        while offset < buf.len() {
            let len = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
            types.push(buf[offset + 4]);
            offset += 4 + len;
        }
        assert_eq!(
            types,
            vec![client_message::EXPECT_OPEN, client_message::SQL_STMT_EXECUTE, client_message::EXPECT_CLOSE]
        );
    }

    #[test]
    #[should_panic(expected = "already locked")]
    fn reentrant_scope_call_panics() {
        let mut b = Builder::new();
        b.locked = true;
        let _ = b.tx(Isolation::Default, |inner| {
            inner.stmt_execute("SELECT 1", Vec::new());
            Ok(())
        });
    }

    #[test]
    fn update_with_eq_criteria_and_date_add_set_value_emits_one_crud_update_frame() {
        let mut b = Builder::new();
        let criteria = expr::eq(expr::column("id"), expr::lit(1i64));
        let value = expr::date_add(expr::now(), expr::lit(100i64), "HOUR");
        b.update("foo", Some(criteria), vec![("val2".to_string(), value)]);
        let buf = b.finish().unwrap();

        assert_eq!(buf[4], client_message::CRUD_UPDATE);
        let declared = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
        assert_eq!(declared, buf.len() - 4);
    }
}
