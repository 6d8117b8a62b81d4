//! Local pool processing
//!
//! The dispatcher re-decodes the sub-batch it just encoded for its own
//! pool. The redundant decode is deliberate: the local and remote paths
//! consume the exact same bytes, so a batch behaves identically whether it
//! stayed here or crossed the wire.

use bytes::Bytes;
use pulse_protocol::{strip_term, ProtocolError, Token, Unpacker};

use crate::error::FailureReason;
use crate::traits::{PointStorage, SeriesRegistry, Value};

/// Convert a decoded point value token into an owned [`Value`]
fn value_of(token: Token<'_>) -> Option<Value> {
    match token {
        Token::Int64(v) => Some(Value::Integer(v)),
        Token::Double(v) => Some(Value::Float(v)),
        Token::Raw(v) => Some(Value::Raw(Bytes::copy_from_slice(v))),
        _ => None,
    }
}

/// Apply a local sub-batch to the series registry and storage
///
/// For each series the value kind is inferred from its first point; the
/// registry only consults the kind when the series does not exist yet.
/// Appends run in sub-batch order, which is client submission order.
///
/// Returns the number of points appended. Decode failures are reported as
/// [`FailureReason::Corrupt`]: the batch came from our own classifier, so
/// they indicate a bug rather than bad client input.
pub(crate) async fn apply_local<R, S>(
    registry: &R,
    storage: &S,
    body: &Bytes,
) -> Result<usize, FailureReason>
where
    R: SeriesRegistry,
    S: PointStorage,
{
    let mut unpacker = Unpacker::new(body);
    let mut points = 0usize;

    match unpacker.next()? {
        Token::MapOpen => {}
        _ => {
            return Err(FailureReason::Corrupt(ProtocolError::malformed(
                "sub-batch does not start with a map",
            )))
        }
    }

    let mut tok = unpacker.next()?;
    while let Token::Raw(raw_name) = tok {
        let name = strip_term(raw_name);

        match unpacker.next()? {
            Token::ArrayOpen => {}
            _ => {
                return Err(FailureReason::Corrupt(ProtocolError::malformed(
                    "series entry without points array",
                )))
            }
        }

        // First point decides the kind for a new series
        expect_point_header(unpacker.next()?)?;
        let (ts, value) = read_point(&mut unpacker)?;
        let series = registry.get_or_create(name, value.kind()).await?;
        storage.append(series, ts, value).await?;
        points += 1;

        tok = unpacker.next()?;
        while tok == Token::Array(2) {
            let (ts, value) = read_point(&mut unpacker)?;
            storage.append(series, ts, value).await?;
            points += 1;
            tok = unpacker.next()?;
        }

        if tok == Token::ArrayClose {
            tok = unpacker.next()?;
        }
    }

    match tok {
        Token::End | Token::MapClose => Ok(points),
        _ => Err(FailureReason::Corrupt(ProtocolError::malformed(
            "unexpected token in sub-batch map",
        ))),
    }
}

fn expect_point_header(token: Token<'_>) -> Result<(), FailureReason> {
    if token == Token::Array(2) {
        Ok(())
    } else {
        Err(FailureReason::Corrupt(ProtocolError::malformed(
            "series without points in sub-batch",
        )))
    }
}

fn read_point(unpacker: &mut Unpacker<'_>) -> Result<(i64, Value), FailureReason> {
    let ts = match unpacker.next()? {
        Token::Int64(ts) => ts,
        _ => {
            return Err(FailureReason::Corrupt(ProtocolError::malformed(
                "point without integer timestamp",
            )))
        }
    };
    let value = value_of(unpacker.next()?).ok_or(FailureReason::Corrupt(
        ProtocolError::malformed("point with unsupported value"),
    ))?;
    Ok((ts, value))
}
