//! Field tags and enum discriminants mirroring the public `Mysqlx*.proto` schema
//! (`Mysqlx.proto`, `Mysqlx_datatypes.proto`, `Mysqlx_expr.proto`,
//! `Mysqlx_crud.proto`, `Mysqlx_sql.proto`, `Mysqlx_prepare.proto`,
//! `Mysqlx_expect.proto`, `Mysqlx_session.proto`, `Mysqlx_connection.proto`).
//!
//! This crate hand-encodes these messages rather than depending on generated
//! Protobuf bindings, so the numeric values below are the schema, restated as
//! constants instead of `.proto` files.

/// `Mysqlx.ClientMessages.Type`
pub mod client_message {
    pub const CON_CAPABILITIES_GET: u8 = 1;
    pub const CON_CAPABILITIES_SET: u8 = 2;
    pub const CON_CLOSE: u8 = 3;
    pub const SESS_AUTHENTICATE_START: u8 = 4;
    pub const SESS_AUTHENTICATE_CONTINUE: u8 = 5;
    pub const SESS_RESET: u8 = 6;
    pub const SESS_CLOSE: u8 = 7;
    pub const SQL_STMT_EXECUTE: u8 = 12;
    pub const CRUD_FIND: u8 = 17;
    pub const CRUD_INSERT: u8 = 18;
    pub const CRUD_UPDATE: u8 = 19;
    pub const CRUD_DELETE: u8 = 20;
    pub const EXPECT_OPEN: u8 = 24;
    pub const EXPECT_CLOSE: u8 = 25;
    pub const PREPARE_PREPARE: u8 = 40;
    pub const PREPARE_EXECUTE: u8 = 41;
    pub const PREPARE_DEALLOCATE: u8 = 42;
}

/// `Mysqlx.ServerMessages.Type`
pub mod server_message {
    pub const OK: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const CONN_CAPABILITIES: u8 = 2;
    pub const SESS_AUTHENTICATE_CONTINUE: u8 = 3;
    pub const SESS_AUTHENTICATE_OK: u8 = 4;
    pub const NOTICE: u8 = 11;
    pub const RESULTSET_COLUMN_META_DATA: u8 = 12;
    pub const RESULTSET_ROW: u8 = 13;
    pub const RESULTSET_FETCH_DONE: u8 = 14;
    pub const RESULTSET_FETCH_SUSPENDED: u8 = 15;
    pub const RESULTSET_FETCH_DONE_MORE_RESULTSETS: u8 = 16;
    pub const SQL_STMT_EXECUTE_OK: u8 = 17;
    pub const RESULTSET_FETCH_DONE_MORE_OUT_PARAMS: u8 = 18;
    pub const COMPRESSION: u8 = 19;
}

/// `Mysqlx.Datatypes.Scalar.Type`
pub mod scalar_type {
    pub const V_SINT: u64 = 1;
    pub const V_UINT: u64 = 2;
    pub const V_NULL: u64 = 3;
    pub const V_OCTETS: u64 = 4;
    pub const V_DOUBLE: u64 = 5;
    pub const V_FLOAT: u64 = 6;
    pub const V_BOOL: u64 = 7;
    pub const V_STRING: u64 = 8;
}

/// `Mysqlx.Datatypes.Scalar` field tags. Tag 4 is reserved for the null
/// variant, which carries no value payload.
pub mod scalar_field {
    pub const TYPE: u8 = 1;
    pub const V_SINT: u8 = 2;
    pub const V_UINT: u8 = 3;
    pub const V_OCTETS: u8 = 5;
    pub const V_DOUBLE: u8 = 6;
    pub const V_FLOAT: u8 = 7;
    pub const V_BOOL: u8 = 8;
    pub const V_STRING: u8 = 9;
}

/// `Mysqlx.Datatypes.Scalar.String` field tags.
pub mod scalar_string_field {
    pub const VALUE: u8 = 1;
    pub const COLLATION: u8 = 2;
}

/// `Mysqlx.Datatypes.Scalar.Octets` field tags.
pub mod scalar_octets_field {
    pub const VALUE: u8 = 1;
    pub const CONTENT_TYPE: u8 = 2;
}

/// `Mysqlx.Datatypes.Any.Type`
pub mod any_type {
    pub const SCALAR: u64 = 1;
}

/// `Mysqlx.Datatypes.Any` field tags.
pub mod any_field {
    pub const TYPE: u8 = 1;
    pub const SCALAR: u8 = 2;
}

/// `Mysqlx.Expr.Expr.Type`
pub mod expr_type {
    pub const IDENT: u64 = 1;
    pub const LITERAL: u64 = 2;
    pub const VARIABLE: u64 = 3;
    pub const FUNC_CALL: u64 = 4;
    pub const OPERATOR: u64 = 5;
    pub const PLACEHOLDER: u64 = 6;
}

/// `Mysqlx.Expr.Expr` field tags.
pub mod expr_field {
    pub const TYPE: u8 = 1;
    pub const IDENTIFIER: u8 = 2;
    pub const VARIABLE: u8 = 3;
    pub const LITERAL: u8 = 4;
    pub const FUNCTION_CALL: u8 = 5;
    pub const OPERATOR: u8 = 6;
    pub const POSITION: u8 = 7;
}

/// `Mysqlx.Expr.ColumnIdentifier` field tags.
pub mod column_identifier_field {
    pub const NAME: u8 = 2;
}

/// `Mysqlx.Expr.Operator` field tags.
pub mod operator_field {
    pub const NAME: u8 = 1;
    pub const PARAM: u8 = 2;
}

/// `Mysqlx.Expr.FunctionCall` field tags.
pub mod function_call_field {
    pub const NAME: u8 = 1;
    pub const PARAM: u8 = 2;
}

/// `Mysqlx.Expr.Identifier` field tags.
pub mod identifier_field {
    pub const NAME: u8 = 1;
}

/// `Mysqlx.Crud.DataModel`
pub mod data_model {
    pub const TABLE: u64 = 1;
}

/// `Mysqlx.Crud.Collection` field tags.
pub mod collection_field {
    pub const NAME: u8 = 1;
}

/// `Mysqlx.Crud.Insert` field tags.
pub mod insert_field {
    pub const COLLECTION: u8 = 1;
    pub const DATA_MODEL: u8 = 2;
    pub const PROJECTION: u8 = 3;
    pub const ROW: u8 = 4;
}

/// `Mysqlx.Crud.Column` field tags.
pub mod column_field {
    pub const NAME: u8 = 1;
}

/// `Mysqlx.Crud.Insert.TypedRow` field tags.
pub mod typed_row_field {
    pub const FIELD: u8 = 1;
}

/// `Mysqlx.Crud.UpdateOperation.UpdateType`
pub mod update_type {
    pub const SET: u64 = 0;
}

/// `Mysqlx.Crud.Update` field tags.
pub mod update_field {
    pub const COLLECTION: u8 = 2;
    pub const DATA_MODEL: u8 = 3;
    pub const CRITERIA: u8 = 4;
    pub const OPERATION: u8 = 7;
}

/// `Mysqlx.Crud.UpdateOperation` field tags.
pub mod update_operation_field {
    pub const SOURCE: u8 = 1;
    pub const OPERATION: u8 = 2;
    pub const VALUE: u8 = 3;
}

/// `Mysqlx.Crud.Delete` field tags.
pub mod delete_field {
    pub const COLLECTION: u8 = 1;
    pub const DATA_MODEL: u8 = 2;
    pub const CRITERIA: u8 = 3;
}

/// `Mysqlx.Sql.StmtExecute` field tags.
pub mod stmt_execute_field {
    pub const STMT: u8 = 2;
    pub const ARGS: u8 = 3;
}

/// `Mysqlx.Prepare.Prepare` field tags.
pub mod prepare_field {
    pub const STMT_ID: u8 = 1;
    pub const STMT: u8 = 2;
}

/// `Mysqlx.Prepare.Prepare.OneOfMessage.Type`
pub mod one_of_message_type {
    pub const STMT: u64 = 4;
}

/// `Mysqlx.Prepare.Prepare.OneOfMessage` field tags.
pub mod one_of_message_field {
    pub const TYPE: u8 = 1;
    pub const STMT_EXECUTE: u8 = 6;
}

/// `Mysqlx.Prepare.Execute` field tags.
pub mod execute_field {
    pub const STMT_ID: u8 = 1;
    pub const ARGS: u8 = 2;
}

/// `Mysqlx.Prepare.Deallocate` field tags.
pub mod deallocate_field {
    pub const STMT_ID: u8 = 1;
}

/// `Mysqlx.Expect.Open` field tags.
pub mod expect_open_field {
    pub const OP: u8 = 1;
    pub const CONDITION: u8 = 2;
}

/// `Mysqlx.Expect.Open.Condition` field tags.
pub mod expect_condition_field {
    pub const CONDITION_KEY: u8 = 1;
    pub const CONDITION_VALUE: u8 = 2;
}

/// `Mysqlx.Expect.Open.CtxOperation`
pub mod expect_ctx_operation {
    pub const EXPECT_CTX_COPY_PREV: u64 = 0;
    pub const EXPECT_CTX_EMPTY: u64 = 1;
}

/// Well-known `Mysqlx.Expect.Open.Condition.Key` value for "no error occurred".
pub const EXPECT_NO_ERROR: u32 = 1;
/// Well-known `Mysqlx.Expect.Open.Condition.Key` value for "field exists".
pub const EXPECT_FIELD_EXIST: u32 = 2;

/// `Mysqlx.Session.Reset` field tags.
pub mod reset_field {
    pub const KEEP_OPEN: u8 = 1;
}

/// `Mysqlx.Session.AuthenticateStart` field tags.
pub mod authenticate_start_field {
    pub const MECH_NAME: u8 = 1;
    pub const AUTH_DATA: u8 = 2;
}

/// `Mysqlx.Session.AuthenticateContinue` field tags.
pub mod authenticate_continue_field {
    pub const AUTH_DATA: u8 = 1;
}

/// `Mysqlx.Connection.CapabilitiesSet` / `Capability` field tags.
pub mod capability_field {
    pub const NAME: u8 = 1;
    pub const VALUE: u8 = 2;
}
pub mod capabilities_field {
    pub const CAPABILITIES: u8 = 1;
}
pub mod capabilities_set_field {
    pub const CAPABILITIES: u8 = 1;
}

/// `Mysqlx.Error` field tags.
pub mod error_field {
    pub const SEVERITY: u8 = 1;
    pub const CODE: u8 = 2;
    pub const MSG: u8 = 3;
    pub const SQL_STATE: u8 = 4;
}

/// `Mysqlx.Error.Severity`
pub mod error_severity {
    pub const ERROR: u64 = 0;
    pub const FATAL: u64 = 1;
}

/// `Mysqlx.Datatypes.Scalar.Octets.ContentType`
pub mod content_type {
    pub const PLAIN: u32 = 0;
    pub const GEOMETRY: u32 = 1;
    pub const JSON: u32 = 2;
    pub const XML: u32 = 3;
}
