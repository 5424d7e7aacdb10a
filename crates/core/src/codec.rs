// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job blob codec
//!
//! Job inputs and results travel between the submitting process and the
//! worker processes as JSON blobs on the shared work area.
//!
//! JSON has no spelling for NaN or the infinities, so [`encode`] refuses
//! non-finite floats instead of writing `null`. Map keys must serialize as
//! strings, integers, booleans or chars; tuple or struct keys are a
//! [`CodecError::Encode`]. Both limits surface at encode time.

use serde::ser::{self, Serializer};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("encode error: non-finite float {0} has no JSON form")]
    NonFinite(f64),
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CodecError {
    /// True when the blob file does not exist
    pub fn is_missing(&self) -> bool {
        matches!(self, CodecError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Encode a value into a blob
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    if let Err(FloatCheck::NonFinite(v)) = value.serialize(FiniteFloats) {
        return Err(CodecError::NonFinite(v));
    }
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Decode a blob back into a value
pub fn decode<T: DeserializeOwned>(blob: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(blob).map_err(CodecError::Decode)
}

/// Encode a value and write it to `path`
pub fn write_blob<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CodecError> {
    let blob = encode(value)?;
    fs::write(path, blob).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the blob at `path` and decode it
pub fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<T, CodecError> {
    let blob = fs::read(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&blob)
}

#[derive(Debug)]
enum FloatCheck {
    NonFinite(f64),
    /// Raised by the value's own `Serialize`; serde_json reports it properly
    Other(String),
}

impl fmt::Display for FloatCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatCheck::NonFinite(v) => write!(f, "non-finite float {}", v),
            FloatCheck::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for FloatCheck {}

impl ser::Error for FloatCheck {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        FloatCheck::Other(msg.to_string())
    }
}

/// Serializer that walks a value and stops at the first NaN or infinity
struct FiniteFloats;

fn check_float(v: f64) -> Result<(), FloatCheck> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(FloatCheck::NonFinite(v))
    }
}

macro_rules! accept {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(fn $method(self, _: $ty) -> Result<(), FloatCheck> {
            Ok(())
        })*
    };
}

impl Serializer for FiniteFloats {
    type Ok = ();
    type Error = FloatCheck;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    );

    fn serialize_f32(self, v: f32) -> Result<(), FloatCheck> {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), FloatCheck> {
        check_float(v)
    }

    fn serialize_none(self) -> Result<(), FloatCheck> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), FloatCheck> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), FloatCheck> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), FloatCheck> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), FloatCheck> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), FloatCheck> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, FloatCheck> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, FloatCheck> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, FloatCheck> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, FloatCheck> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, FloatCheck> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, FloatCheck> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, FloatCheck> {
        Ok(self)
    }
}

macro_rules! walk_elements {
    ($($trait:ident :: $method:ident),* $(,)?) => {
        $(impl ser::$trait for FiniteFloats {
            type Ok = ();
            type Error = FloatCheck;

            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FloatCheck> {
                value.serialize(FiniteFloats)
            }

            fn end(self) -> Result<(), FloatCheck> {
                Ok(())
            }
        })*
    };
}

walk_elements!(
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
);

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = FloatCheck;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), FloatCheck> {
        key.serialize(FiniteFloats)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FloatCheck> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), FloatCheck> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = FloatCheck;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), FloatCheck> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), FloatCheck> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = FloatCheck;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), FloatCheck> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), FloatCheck> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
