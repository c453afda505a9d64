//! Codec for change events on the wire.
//!
//! Events are MessagePack-encoded with a length prefix so a stream of them
//! can be framed over any byte transport.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::event::ChangeEvent;

/// Maximum encoded event size (1 MiB). Row images are small; anything
/// larger is a corrupt frame.
pub const MAX_EVENT_SIZE: usize = 1024 * 1024;

/// Length prefix size in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Event exceeds maximum size.
    #[error("Event size {0} exceeds maximum {MAX_EVENT_SIZE}")]
    EventTooLarge(usize),

    /// Not enough data to decode an event.
    #[error("Incomplete event: need {0} more bytes")]
    Incomplete(usize),

    /// MessagePack encoding error.
    #[error("Encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// MessagePack decoding error.
    #[error("Decoding error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Encode an event to bytes.
///
/// The encoded format is a 4-byte big-endian length prefix followed by the
/// MessagePack-encoded event.
///
/// # Errors
///
/// Returns an error if the event is too large or encoding fails.
pub fn encode(event: &ChangeEvent) -> Result<Bytes, CodecError> {
    let payload = rmp_serde::to_vec_named(event)?;

    if payload.len() > MAX_EVENT_SIZE {
        return Err(CodecError::EventTooLarge(payload.len()));
    }

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(&payload);

    Ok(buf.freeze())
}

/// Decode a single event from bytes.
///
/// # Errors
///
/// Returns an error if the data is incomplete, too large, or invalid.
pub fn decode(data: &[u8]) -> Result<ChangeEvent, CodecError> {
    if data.len() < LENGTH_PREFIX_SIZE {
        return Err(CodecError::Incomplete(LENGTH_PREFIX_SIZE - data.len()));
    }

    let length = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;

    if length > MAX_EVENT_SIZE {
        return Err(CodecError::EventTooLarge(length));
    }

    let total_size = LENGTH_PREFIX_SIZE + length;
    if data.len() < total_size {
        return Err(CodecError::Incomplete(total_size - data.len()));
    }

    let event = rmp_serde::from_slice(&data[LENGTH_PREFIX_SIZE..total_size])?;
    Ok(event)
}

/// Try to decode an event from a buffer, advancing it if successful.
///
/// Returns `Ok(Some(event))` if a complete event was decoded, `Ok(None)` if
/// more data is needed.
///
/// # Errors
///
/// Returns an error if the event is too large or invalid.
pub fn decode_from(buf: &mut BytesMut) -> Result<Option<ChangeEvent>, CodecError> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let length = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    if length > MAX_EVENT_SIZE {
        return Err(CodecError::EventTooLarge(length));
    }

    let total_size = LENGTH_PREFIX_SIZE + length;
    if buf.len() < total_size {
        return Ok(None);
    }

    buf.advance(LENGTH_PREFIX_SIZE);
    let payload = buf.split_to(length);
    let event = rmp_serde::from_slice(&payload)?;

    Ok(Some(event))
}
