//! Parses length-prefixed server frames off a single response stream,
//! classifying each by message type, aggregating per-request responses, and
//! surfacing errors and authenticate-continue nonces as typed interrupts.
//!
//! A single logical "response" to one client frame may span several server
//! frames — column metadata, rows, notices — before the terminating `OK`/
//! `SQL_STMT_EXECUTE_OK`/`ERROR`. Row and column-metadata *contents* are out
//! of scope (see crate docs); this reader only recognises frame boundaries
//! well enough to multiplex them correctly.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{protocol_err, Error, MySqlXError, Result, Severity};
use crate::proto::tags::{
    authenticate_continue_field, client_message, error_field, error_severity, server_message,
};
use crate::wire;

/// One response to a single client frame.
#[derive(Debug, Clone)]
pub struct Response {
    /// `true` for `OK`/`SESS_AUTHENTICATE_OK`/`SQL_STMT_EXECUTE_OK`.
    pub ok: bool,
    /// Present iff the server reported a (non-fatal) error for this frame.
    pub error: Option<MySqlXError>,
    /// Raw `RESULTSET_COLUMN_META_DATA` payloads accumulated ahead of the
    /// terminating OK, in server order. Decoding these further is out of
    /// scope for this crate.
    pub column_metadata: Vec<Vec<u8>>,
}

impl Response {
    fn ok(column_metadata: Vec<Vec<u8>>) -> Self {
        Response { ok: true, error: None, column_metadata }
    }

    fn error(err: MySqlXError, column_metadata: Vec<Vec<u8>>) -> Self {
        Response { ok: false, error: Some(err), column_metadata }
    }
}

/// What [`read_one`] produced: either a completed response, or (only ever
/// returned when `originating_type == SESS_AUTHENTICATE_START`) the server's
/// `AuthenticateContinue` nonce.
pub enum ReadOutcome {
    Response(Response),
    AuthenticateContinue(Vec<u8>),
}

/// A `send`/pipeline read that failed partway through: carries every
/// response successfully read before the failure alongside the error that
/// ended the read, so the caller both observes what the server already said
/// and learns the connection can no longer be used.
#[derive(Debug)]
pub struct PipelineError {
    pub responses: Vec<Response>,
    pub error: Error,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (after {} response(s))", self.error, self.responses.len())
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Reads server frames until one client-response-unit is complete, i.e.
/// until an `OK`-class or `ERROR` frame terminates it. `originating_type` is
/// the client message type that produced this response — needed to classify
/// `ERROR`/`AuthenticateContinue` correctly (see module docs).
pub async fn read_one<R: AsyncRead + Unpin>(
    stream: &mut R,
    scratch: &mut BytesMut,
    originating_type: u8,
) -> Result<ReadOutcome> {
    let mut column_metadata = Vec::new();

    loop {
        let mut header = [0u8; 5];
        stream.read_exact(&mut header).await?;
        let len = u32::from_le_bytes(header[0..4].try_into().unwrap());
        if len == 0 {
            return Err(protocol_err!("frame length too short"));
        }
        let msg_type = header[4];
        let payload_len = len as usize - 1;

        scratch.resize(payload_len, 0);
        stream.read_exact(&mut scratch[..]).await?;

        match msg_type {
            server_message::OK
            | server_message::SESS_AUTHENTICATE_OK
            | server_message::SQL_STMT_EXECUTE_OK => {
                return Ok(ReadOutcome::Response(Response::ok(column_metadata)));
            }

            server_message::ERROR => {
                let err = parse_error(scratch)?;
                if err.is_fatal() {
                    return Err(Error::Server(err));
                }
                let unrecoverable_origin = matches!(
                    originating_type,
                    client_message::SESS_RESET
                        | client_message::SESS_AUTHENTICATE_START
                        | client_message::SESS_AUTHENTICATE_CONTINUE
                );
                if unrecoverable_origin {
                    return Err(Error::Server(err));
                }
                return Ok(ReadOutcome::Response(Response::error(err, column_metadata)));
            }

            server_message::RESULTSET_COLUMN_META_DATA => {
                column_metadata.push(scratch.to_vec());
            }

            server_message::NOTICE => {
                // Transport-level warnings; nothing to surface.
            }

            server_message::SESS_AUTHENTICATE_CONTINUE => {
                if originating_type != client_message::SESS_AUTHENTICATE_START {
                    return Err(protocol_err!(
                        "received AuthenticateContinue outside of an authentication start"
                    ));
                }
                let auth_data = wire::read_bytes_field(scratch, authenticate_continue_field::AUTH_DATA)
                    .ok_or_else(|| protocol_err!("malformed AuthenticateContinue payload"))?;
                return Ok(ReadOutcome::AuthenticateContinue(auth_data.to_vec()));
            }

            _ => {
                // RESULTSET_ROW, FETCH_DONE, and anything else: row
                // materialisation is out of scope, keep reading.
            }
        }
    }
}

/// Reads exactly `originating_types.len()` responses, one per input client
/// frame, in order. On any failure — transport error, fatal server error, a
/// misplaced `AuthenticateContinue` — returns every response read so far
/// alongside the error via [`PipelineError`].
pub async fn read_responses<R: AsyncRead + Unpin>(
    stream: &mut R,
    scratch: &mut BytesMut,
    originating_types: &[u8],
) -> std::result::Result<Vec<Response>, PipelineError> {
    let mut out = Vec::with_capacity(originating_types.len());
    for &ty in originating_types {
        match read_one(stream, scratch, ty).await {
            Ok(ReadOutcome::Response(r)) => out.push(r),
            Ok(ReadOutcome::AuthenticateContinue(_)) => {
                return Err(PipelineError {
                    responses: out,
                    error: protocol_err!("unexpected AuthenticateContinue in a send pipeline"),
                });
            }
            Err(error) => return Err(PipelineError { responses: out, error }),
        }
    }
    Ok(out)
}

/// Parses a `Mysqlx.Error` payload: `severity` (varint enum), `code`
/// (varint), `msg`/`sql_state` (length-delimited strings). Unknown fields
/// are ignored, matching the forward-compatibility rule in the crate docs.
fn parse_error(buf: &[u8]) -> Result<MySqlXError> {
    let mut severity = error_severity::ERROR;
    let mut code = 0u32;

    wire::for_each_field(buf, |tag, value| match tag {
        t if t == error_field::SEVERITY => severity = value,
        t if t == error_field::CODE => code = value as u32,
        _ => {}
    })
    .ok_or_else(|| protocol_err!("malformed Error payload"))?;

    let message = wire::read_bytes_field(buf, error_field::MSG)
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default();
    let sql_state = wire::read_bytes_field(buf, error_field::SQL_STATE)
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default();

    Ok(MySqlXError {
        severity: if severity == error_severity::FATAL { Severity::Fatal } else { Severity::Error },
        code,
        sql_state,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_payload(severity: u64, code: u32, sql_state: &str, msg: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        wire::append_varint_field(&mut buf, error_field::SEVERITY, severity);
        wire::append_varint_field(&mut buf, error_field::CODE, code as u64);
        wire::append_string_field(&mut buf, error_field::MSG, msg);
        wire::append_string_field(&mut buf, error_field::SQL_STATE, sql_state);
        buf
    }

    #[tokio::test]
    async fn ok_frame_yields_successful_response() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.push(server_message::OK);
        let mut stream = std::io::Cursor::new(frame);
        let mut scratch = BytesMut::new();
        let outcome = read_one(&mut stream, &mut scratch, client_message::SQL_STMT_EXECUTE)
            .await
            .unwrap();
        assert!(matches!(outcome, ReadOutcome::Response(r) if r.ok));
    }

    #[tokio::test]
    async fn non_fatal_error_is_emitted_as_response() {
        let payload = error_payload(error_severity::ERROR, 1045, "HY000", "Access denied");
        let mut frame = Vec::new();
        frame.extend_from_slice(&((payload.len() + 1) as u32).to_le_bytes());
        frame.push(server_message::ERROR);
        frame.extend_from_slice(&payload);

        let mut stream = std::io::Cursor::new(frame);
        let mut scratch = BytesMut::new();
        let outcome = read_one(&mut stream, &mut scratch, client_message::SQL_STMT_EXECUTE)
            .await
            .unwrap();
        match outcome {
            ReadOutcome::Response(r) => {
                assert!(!r.ok);
                assert_eq!(r.error.unwrap().code, 1045);
            }
            _ => panic!("expected a Response"),
        }
    }

    #[tokio::test]
    async fn fatal_error_is_returned_as_err() {
        let payload = error_payload(error_severity::FATAL, 2013, "HY000", "Lost connection");
        let mut frame = Vec::new();
        frame.extend_from_slice(&((payload.len() + 1) as u32).to_le_bytes());
        frame.push(server_message::ERROR);
        frame.extend_from_slice(&payload);

        let mut stream = std::io::Cursor::new(frame);
        let mut scratch = BytesMut::new();
        let err = read_one(&mut stream, &mut scratch, client_message::SQL_STMT_EXECUTE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Server(e) if e.is_fatal()));
    }

    #[tokio::test]
    async fn pipeline_preserves_responses_before_fatal_error() {
        let mut stream = Vec::new();
        // Frame 1: OK
        stream.extend_from_slice(&1u32.to_le_bytes());
        stream.push(server_message::OK);
        // Frame 2: fatal ERROR
        let payload = error_payload(error_severity::FATAL, 2013, "HY000", "gone");
        stream.extend_from_slice(&((payload.len() + 1) as u32).to_le_bytes());
        stream.push(server_message::ERROR);
        stream.extend_from_slice(&payload);

        let mut cursor = std::io::Cursor::new(stream);
        let mut scratch = BytesMut::new();
        let types = [client_message::SQL_STMT_EXECUTE, client_message::SQL_STMT_EXECUTE];
        let err = read_responses(&mut cursor, &mut scratch, &types).await.unwrap_err();
        assert_eq!(err.responses.len(), 1);
        assert!(err.responses[0].ok);
    }

    #[tokio::test]
    async fn three_frame_pipeline_with_non_fatal_middle_error_yields_three_ordered_responses() {
        let mut stream = Vec::new();
        // Frame 1: OK
        stream.extend_from_slice(&1u32.to_le_bytes());
        stream.push(server_message::OK);
        // Frame 2: non-fatal ERROR
        let payload = error_payload(error_severity::ERROR, 1146, "42S02", "Table doesn't exist");
        stream.extend_from_slice(&((payload.len() + 1) as u32).to_le_bytes());
        stream.push(server_message::ERROR);
        stream.extend_from_slice(&payload);
        // Frame 3: OK
        stream.extend_from_slice(&1u32.to_le_bytes());
        stream.push(server_message::OK);

        let mut cursor = std::io::Cursor::new(stream);
        let mut scratch = BytesMut::new();
        let types = [
            client_message::SQL_STMT_EXECUTE,
            client_message::SQL_STMT_EXECUTE,
            client_message::SQL_STMT_EXECUTE,
        ];
        let responses = read_responses(&mut cursor, &mut scratch, &types).await.unwrap();
        assert_eq!(responses.len(), 3);
        assert!(responses[0].ok);
        assert!(!responses[1].ok);
        assert_eq!(responses[1].error.as_ref().unwrap().code, 1146);
        assert!(responses[2].ok);
    }
}
