//! Canonical encoding for hashing, signing and cross-node comparison.
//!
//! Two layers live here:
//!
//! - [`CanonicalValue`]: a self-describing tagged value. Each value encodes as
//!   `tag || varint(len) || payload`, so it decodes without a schema.
//! - [`CanonicalWriter`] / [`CanonicalReader`]: the field framing used by every
//!   ledger structure. A structure is `varint(kind) || varint(version)`
//!   followed by its fields in declared order, each `varint(len) || bytes`.
//!
//! **CRITICAL**: This encoding is FROZEN. Any drift changes every hash and
//! invalidates every signature.

use num_bigint::BigUint;
use serde_json::{Map, Number, Value as JsonValue};

use crate::action::ActionKind;
use crate::crypto::Sha256Hash;
use crate::error::CodecError;
use crate::varint::{decode_varbigint, decode_varint, encode_varbigint, encode_varint};

/// One-byte type tags.
mod tags {
    pub const STRING: u8 = 0;
    pub const BIG_INT: u8 = 1;
    pub const UNSIGNED_INT: u8 = 2;
    pub const OBJECT: u8 = 3;
    pub const BOOLEAN: u8 = 4;
    pub const ARRAY: u8 = 5;
}

/// Nesting limit for arrays and objects. Enforced on encode, decode and JSON
/// conversion alike.
pub const MAX_DEPTH: usize = 64;

/// A canonical value.
///
/// Object fields keep insertion order. Producers that need stable hashes
/// must insert fields in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    String(String),
    BigInt(BigUint),
    UnsignedInt(u64),
    Object(Vec<(String, CanonicalValue)>),
    Boolean(bool),
    Array(Vec<CanonicalValue>),
}

impl CanonicalValue {
    /// Build an object from `(key, value)` pairs, preserving their order.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, CanonicalValue)>) -> Self {
        CanonicalValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up an object field by key (first match).
    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        match self {
            CanonicalValue::Object(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            CanonicalValue::UnsignedInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, CanonicalValue::Object(_))
    }

    /// Nesting depth: scalars and empty containers are 0, a container is one
    /// more than its deepest member.
    pub fn depth(&self) -> usize {
        let children = match self {
            CanonicalValue::Array(items) => items.iter().map(CanonicalValue::depth).max(),
            CanonicalValue::Object(entries) => entries.iter().map(|(_, v)| v.depth()).max(),
            _ => None,
        };
        children.map_or(0, |d| d + 1)
    }

    /// Encode to canonical bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode(self)
    }

    /// Lossy JSON projection: big integers become decimal strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            CanonicalValue::String(s) => JsonValue::String(s.clone()),
            CanonicalValue::BigInt(n) => JsonValue::String(n.to_str_radix(10)),
            CanonicalValue::UnsignedInt(n) => JsonValue::Number((*n).into()),
            CanonicalValue::Boolean(b) => JsonValue::Bool(*b),
            CanonicalValue::Array(items) => {
                JsonValue::Array(items.iter().map(CanonicalValue::to_json).collect())
            }
            CanonicalValue::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                JsonValue::Object(map)
            }
        }
    }

    /// Convert from JSON.
    ///
    /// Null, negative numbers, non-integers and nesting beyond [`MAX_DEPTH`]
    /// have no canonical form and are rejected with
    /// [`CodecError::UnsupportedFieldType`]. Integers that fit a `u64` become
    /// `UnsignedInt`; decimal strings stay strings.
    pub fn from_json(json: &JsonValue) -> Result<Self, CodecError> {
        Self::from_json_at(json, 0)
    }

    fn from_json_at(json: &JsonValue, depth: usize) -> Result<Self, CodecError> {
        if depth > MAX_DEPTH {
            return Err(too_deep());
        }
        match json {
            JsonValue::Null => Err(CodecError::UnsupportedFieldType("null".into())),
            JsonValue::Bool(b) => Ok(CanonicalValue::Boolean(*b)),
            JsonValue::String(s) => Ok(CanonicalValue::String(s.clone())),
            JsonValue::Number(n) => number_from_json(n),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| CanonicalValue::from_json_at(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(CanonicalValue::Array),
            JsonValue::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), CanonicalValue::from_json_at(v, depth + 1)?)))
                .collect::<Result<Vec<_>, CodecError>>()
                .map(CanonicalValue::Object),
        }
    }
}

fn too_deep() -> CodecError {
    CodecError::UnsupportedFieldType(format!("value nested deeper than {MAX_DEPTH}"))
}

fn number_from_json(n: &Number) -> Result<CanonicalValue, CodecError> {
    if let Some(u) = n.as_u64() {
        return Ok(CanonicalValue::UnsignedInt(u));
    }
    if n.as_i64().is_some() {
        return Err(CodecError::UnsupportedFieldType(format!("negative number {n}")));
    }
    // Finite non-integers; serde_json cannot represent NaN or Infinity at all.
    Err(CodecError::UnsupportedFieldType(format!("non-integer number {n}")))
}

impl From<&str> for CanonicalValue {
    fn from(s: &str) -> Self {
        CanonicalValue::String(s.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(s: String) -> Self {
        CanonicalValue::String(s)
    }
}

impl From<u64> for CanonicalValue {
    fn from(n: u64) -> Self {
        CanonicalValue::UnsignedInt(n)
    }
}

impl From<bool> for CanonicalValue {
    fn from(b: bool) -> Self {
        CanonicalValue::Boolean(b)
    }
}

impl From<BigUint> for CanonicalValue {
    fn from(n: BigUint) -> Self {
        CanonicalValue::BigInt(n)
    }
}

/// Encode a value to canonical bytes.
///
/// Values nested deeper than [`MAX_DEPTH`] are refused, since [`decode`]
/// would refuse them too.
pub fn encode(value: &CanonicalValue) -> Result<Vec<u8>, CodecError> {
    if value.depth() > MAX_DEPTH {
        return Err(too_deep());
    }
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    Ok(buf)
}

/// Decode a value, returning it and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(CanonicalValue, usize), CodecError> {
    decode_value(bytes, 0)
}

/// Recursively encode a value as `tag || varint(len) || payload`.
fn encode_value_to(buf: &mut Vec<u8>, value: &CanonicalValue) {
    let mut payload = Vec::new();
    let tag = match value {
        CanonicalValue::String(s) => {
            payload.extend_from_slice(s.as_bytes());
            tags::STRING
        }
        CanonicalValue::BigInt(n) => {
            encode_varbigint(&mut payload, n);
            tags::BIG_INT
        }
        CanonicalValue::UnsignedInt(n) => {
            encode_varint(&mut payload, *n);
            tags::UNSIGNED_INT
        }
        CanonicalValue::Object(entries) => {
            for (key, v) in entries {
                encode_varint(&mut payload, key.len() as u64);
                payload.extend_from_slice(key.as_bytes());
                encode_value_to(&mut payload, v);
            }
            tags::OBJECT
        }
        CanonicalValue::Boolean(b) => {
            payload.push(u8::from(*b));
            tags::BOOLEAN
        }
        CanonicalValue::Array(items) => {
            for item in items {
                encode_value_to(&mut payload, item);
            }
            tags::ARRAY
        }
    };
    buf.push(tag);
    encode_varint(buf, payload.len() as u64);
    buf.extend_from_slice(&payload);
}

fn decode_value(bytes: &[u8], depth: usize) -> Result<(CanonicalValue, usize), CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::Malformed("value nesting too deep".into()));
    }
    let tag = *bytes.first().ok_or(CodecError::TruncatedInput {
        needed: 1,
        available: 0,
    })?;
    let unsupported = || CodecError::UnsupportedFieldType(format!("tag {tag}"));
    if tag > tags::ARRAY {
        return Err(unsupported());
    }

    let (body, consumed) = split_prefixed(&bytes[1..])?;
    let consumed = consumed + 1;

    let value = match tag {
        tags::STRING => CanonicalValue::String(utf8(body)?),
        tags::BIG_INT => {
            let (n, used) = decode_varbigint(body)?;
            exact(body, used)?;
            CanonicalValue::BigInt(n)
        }
        tags::UNSIGNED_INT => {
            let (n, used) = decode_varint(body)?;
            exact(body, used)?;
            CanonicalValue::UnsignedInt(n)
        }
        tags::BOOLEAN => match body {
            [0] => CanonicalValue::Boolean(false),
            [1] => CanonicalValue::Boolean(true),
            _ => return Err(CodecError::Malformed("boolean must be a single 0 or 1 byte".into())),
        },
        tags::ARRAY => {
            let mut items = Vec::new();
            let mut pos = 0;
            while pos < body.len() {
                let (item, used) = decode_value(&body[pos..], depth + 1)?;
                items.push(item);
                pos += used;
            }
            CanonicalValue::Array(items)
        }
        tags::OBJECT => {
            let mut entries = Vec::new();
            let mut pos = 0;
            while pos < body.len() {
                let (key, used) = split_prefixed(&body[pos..])?;
                let key = utf8(key)?;
                pos += used;
                let (v, used) = decode_value(&body[pos..], depth + 1)?;
                pos += used;
                entries.push((key, v));
            }
            CanonicalValue::Object(entries)
        }
        _ => return Err(unsupported()),
    };

    Ok((value, consumed))
}

/// Split `varint(len) || body || rest` into `body` and the bytes consumed.
fn split_prefixed(bytes: &[u8]) -> Result<(&[u8], usize), CodecError> {
    let (len, n) = decode_varint(bytes)?;
    let len = usize::try_from(len).map_err(|_| CodecError::VarIntOverflow)?;
    let end = n.checked_add(len).ok_or(CodecError::VarIntOverflow)?;
    if end > bytes.len() {
        return Err(CodecError::TruncatedInput {
            needed: end,
            available: bytes.len(),
        });
    }
    Ok((&bytes[n..end], end))
}

fn exact(body: &[u8], used: usize) -> Result<(), CodecError> {
    if used != body.len() {
        return Err(CodecError::TrailingBytes(body.len() - used));
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| CodecError::InvalidUtf8)
}

/// Field-framed writer for ledger structures.
#[derive(Debug, Default)]
pub struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a structure with its kind discriminant and version.
    pub fn with_header(kind: ActionKind, version: u64) -> Self {
        let mut writer = Self::new();
        writer.put_varint(kind.to_u64()).put_varint(version);
        writer
    }

    /// Write an unframed varint.
    pub fn put_varint(&mut self, n: u64) -> &mut Self {
        encode_varint(&mut self.buf, n);
        self
    }

    /// Write a length-prefixed byte field.
    pub fn field_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        encode_varint(&mut self.buf, bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn field_u64(&mut self, n: u64) -> &mut Self {
        let mut tmp = Vec::with_capacity(10);
        encode_varint(&mut tmp, n);
        self.field_bytes(&tmp)
    }

    pub fn field_str(&mut self, s: &str) -> &mut Self {
        self.field_bytes(s.as_bytes())
    }

    pub fn field_bool(&mut self, b: bool) -> &mut Self {
        self.field_bytes(&[u8::from(b)])
    }

    pub fn field_hash(&mut self, hash: &Sha256Hash) -> &mut Self {
        self.field_bytes(&hash.0)
    }

    /// Absent hashes are written as an empty field.
    pub fn field_opt_hash(&mut self, hash: Option<&Sha256Hash>) -> &mut Self {
        match hash {
            Some(h) => self.field_hash(h),
            None => self.field_bytes(&[]),
        }
    }

    /// Absent integers are written as an empty field.
    pub fn field_opt_u64(&mut self, n: Option<u64>) -> &mut Self {
        match n {
            Some(n) => self.field_u64(n),
            None => self.field_bytes(&[]),
        }
    }

    /// Write a canonical value without the depth check of [`encode`].
    ///
    /// Callers validate depth themselves; a value deeper than [`MAX_DEPTH`]
    /// is written but will not decode.
    pub fn field_value(&mut self, value: &CanonicalValue) -> &mut Self {
        let mut buf = Vec::new();
        encode_value_to(&mut buf, value);
        self.field_bytes(&buf)
    }

    /// Write a nested, length-prefixed section.
    pub fn field_section(&mut self, build: impl FnOnce(&mut CanonicalWriter)) -> &mut Self {
        let mut inner = CanonicalWriter::new();
        build(&mut inner);
        self.field_bytes(&inner.buf)
    }

    /// Write `varint(count)` followed by each item as a byte field.
    pub fn field_list<I, B>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: ExactSizeIterator,
        B: AsRef<[u8]>,
    {
        let items = items.into_iter();
        self.field_section(|w| {
            w.put_varint(items.len() as u64);
            for item in items {
                w.field_bytes(item.as_ref());
            }
        })
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Field-framed reader mirroring [`CanonicalWriter`].
#[derive(Debug, Clone)]
pub struct CanonicalReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> CanonicalReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Read the structure header and check its kind. Returns the version.
    pub fn read_header(&mut self, expected: ActionKind) -> Result<u64, CodecError> {
        let got = ActionKind::from_u64(self.read_varint()?)?;
        if got != expected {
            return Err(CodecError::UnexpectedKind { expected, got });
        }
        self.read_varint()
    }

    /// Read an unframed varint.
    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let (n, used) = decode_varint(&self.bytes[self.pos..])?;
        self.pos += used;
        Ok(n)
    }

    pub fn field_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let (body, used) = split_prefixed(&self.bytes[self.pos..])?;
        self.pos += used;
        Ok(body)
    }

    pub fn field_u64(&mut self) -> Result<u64, CodecError> {
        let body = self.field_bytes()?;
        let (n, used) = decode_varint(body)?;
        exact(body, used)?;
        Ok(n)
    }

    pub fn field_str(&mut self) -> Result<String, CodecError> {
        utf8(self.field_bytes()?)
    }

    pub fn field_bool(&mut self) -> Result<bool, CodecError> {
        match self.field_bytes()? {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(CodecError::Malformed("boolean field must be 0 or 1".into())),
        }
    }

    pub fn field_hash(&mut self) -> Result<Sha256Hash, CodecError> {
        Sha256Hash::try_from(self.field_bytes()?)
    }

    pub fn field_opt_hash(&mut self) -> Result<Option<Sha256Hash>, CodecError> {
        let body = self.field_bytes()?;
        if body.is_empty() {
            return Ok(None);
        }
        Sha256Hash::try_from(body).map(Some)
    }

    pub fn field_opt_u64(&mut self) -> Result<Option<u64>, CodecError> {
        let body = self.field_bytes()?;
        if body.is_empty() {
            return Ok(None);
        }
        let (n, used) = decode_varint(body)?;
        exact(body, used)?;
        Ok(Some(n))
    }

    pub fn field_value(&mut self) -> Result<CanonicalValue, CodecError> {
        let body = self.field_bytes()?;
        let (value, used) = decode(body)?;
        exact(body, used)?;
        Ok(value)
    }

    /// Read a nested section as its own reader.
    pub fn field_section(&mut self) -> Result<CanonicalReader<'a>, CodecError> {
        Ok(CanonicalReader::new(self.field_bytes()?))
    }

    /// Read a list written by [`CanonicalWriter::field_list`].
    pub fn field_list(&mut self) -> Result<Vec<&'a [u8]>, CodecError> {
        let mut section = self.field_section()?;
        let count = section.read_varint()?;
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(section.field_bytes()?);
        }
        section.finish()?;
        Ok(items)
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Require that every byte was consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        let rest = self.bytes.len() - self.pos;
        if rest != 0 {
            return Err(CodecError::TrailingBytes(rest));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CanonicalValue {
        CanonicalValue::object([
            ("name", CanonicalValue::from("core.banking")),
            ("amount", CanonicalValue::BigInt(BigUint::from(10u8).pow(30))),
            ("count", CanonicalValue::from(42u64)),
            ("active", CanonicalValue::from(true)),
            (
                "tags",
                CanonicalValue::Array(vec!["a".into(), CanonicalValue::from(7u64)]),
            ),
            ("nested", CanonicalValue::object([("x", CanonicalValue::from(0u64))])),
        ])
    }

    #[test]
    fn test_roundtrip_reports_consumed_length() {
        let value = sample();
        let bytes = encode(&value).unwrap();
        let (decoded, consumed) = decode(&bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_decode_ignores_following_bytes() {
        let mut bytes = encode(&CanonicalValue::from("hi")).unwrap();
        let len = bytes.len();
        bytes.extend_from_slice(&[0xde, 0xad]);
        let (_, consumed) = decode(&bytes).unwrap();
        assert_eq!(consumed, len);
    }

    #[test]
    fn test_scalar_layout() {
        assert_eq!(encode(&CanonicalValue::from("ab")).unwrap(), vec![0, 2, b'a', b'b']);
        assert_eq!(encode(&CanonicalValue::from(300u64)).unwrap(), vec![2, 2, 0xac, 0x02]);
        assert_eq!(encode(&CanonicalValue::from(true)).unwrap(), vec![4, 1, 1]);
        assert_eq!(encode(&CanonicalValue::Array(vec![])).unwrap(), vec![5, 0]);
    }

    #[test]
    fn test_object_preserves_insertion_order() {
        let ab = CanonicalValue::object([("a", CanonicalValue::from(1u64)), ("b", CanonicalValue::from(2u64))]);
        let ba = CanonicalValue::object([("b", CanonicalValue::from(2u64)), ("a", CanonicalValue::from(1u64))]);
        assert_ne!(encode(&ab), encode(&ba));
        assert_eq!(decode(&encode(&ba).unwrap()).unwrap().0, ba);
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        assert!(matches!(
            decode(&[9, 0]),
            Err(CodecError::UnsupportedFieldType(_))
        ));
    }

    #[test]
    fn test_truncated_input_is_fatal() {
        let bytes = encode(&sample()).unwrap();
        for cut in [0, 1, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                matches!(decode(&bytes[..cut]), Err(CodecError::TruncatedInput { .. })),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_bad_boolean_payload() {
        assert!(matches!(decode(&[4, 1, 2]), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_json_projection_is_lossy_for_bigints() {
        let json = sample().to_json();
        assert_eq!(json["amount"], json!("1000000000000000000000000000000"));
        assert_eq!(json["count"], json!(42));

        let back = CanonicalValue::from_json(&json).unwrap();
        assert_ne!(back, sample());
        assert_eq!(
            back.get("amount").and_then(CanonicalValue::as_str),
            Some("1000000000000000000000000000000")
        );
    }

    #[test]
    fn test_json_rejects_unsupported_numbers() {
        for bad in [json!(-1), json!(1.5), json!(null), json!({"a": [null]})] {
            assert!(matches!(
                CanonicalValue::from_json(&bad),
                Err(CodecError::UnsupportedFieldType(_))
            ));
        }
    }

    fn nested_arrays(depth: usize) -> CanonicalValue {
        (0..depth).fold(CanonicalValue::from(1u64), |inner, _| {
            CanonicalValue::Array(vec![inner])
        })
    }

    fn nested_json(depth: usize) -> serde_json::Value {
        (0..depth).fold(json!(1), |inner, _| json!([inner]))
    }

    #[test]
    fn test_depth() {
        assert_eq!(CanonicalValue::from(1u64).depth(), 0);
        assert_eq!(CanonicalValue::Array(vec![]).depth(), 0);
        assert_eq!(sample().depth(), 2);
        assert_eq!(nested_arrays(MAX_DEPTH).depth(), MAX_DEPTH);
    }

    #[test]
    fn test_depth_limit_is_shared_by_encode_and_decode() {
        let deepest = nested_arrays(MAX_DEPTH);
        let bytes = encode(&deepest).unwrap();
        assert_eq!(decode(&bytes).unwrap(), (deepest, bytes.len()));

        assert!(matches!(
            encode(&nested_arrays(MAX_DEPTH + 1)),
            Err(CodecError::UnsupportedFieldType(_))
        ));

        // Hand-built bytes one level too deep are still refused on decode.
        let mut too_deep = encode(&CanonicalValue::from(1u64)).unwrap();
        for _ in 0..=MAX_DEPTH {
            let mut outer = vec![tags::ARRAY];
            encode_varint(&mut outer, too_deep.len() as u64);
            outer.extend_from_slice(&too_deep);
            too_deep = outer;
        }
        assert!(decode(&too_deep).is_err());
    }

    #[test]
    fn test_json_depth_limit() {
        let deepest = CanonicalValue::from_json(&nested_json(MAX_DEPTH)).unwrap();
        assert_eq!(deepest, nested_arrays(MAX_DEPTH));

        assert!(matches!(
            CanonicalValue::from_json(&nested_json(MAX_DEPTH + 1)),
            Err(CodecError::UnsupportedFieldType(_))
        ));
    }

    #[test]
    fn test_writer_reader_fields() {
        let hash = Sha256Hash::hash(b"prev");
        let mut w = CanonicalWriter::with_header(ActionKind::Transfer, 1);
        w.field_u64(99)
            .field_str("alice")
            .field_bool(true)
            .field_opt_hash(None)
            .field_opt_hash(Some(&hash))
            .field_opt_u64(None)
            .field_opt_u64(Some(0))
            .field_value(&sample())
            .field_list(vec![b"one".to_vec(), b"two".to_vec()]);
        let bytes = w.into_bytes();

        let mut r = CanonicalReader::new(&bytes);
        assert_eq!(r.read_header(ActionKind::Transfer).unwrap(), 1);
        assert_eq!(r.field_u64().unwrap(), 99);
        assert_eq!(r.field_str().unwrap(), "alice");
        assert!(r.field_bool().unwrap());
        assert_eq!(r.field_opt_hash().unwrap(), None);
        assert_eq!(r.field_opt_hash().unwrap(), Some(hash));
        assert_eq!(r.field_opt_u64().unwrap(), None);
        assert_eq!(r.field_opt_u64().unwrap(), Some(0));
        assert_eq!(r.field_value().unwrap(), sample());
        assert_eq!(r.field_list().unwrap(), vec![&b"one"[..], &b"two"[..]]);
        r.finish().unwrap();
    }

    #[test]
    fn test_reader_rejects_wrong_kind() {
        let bytes = CanonicalWriter::with_header(ActionKind::Voucher, 1).into_bytes();
        let mut r = CanonicalReader::new(&bytes);
        assert_eq!(
            r.read_header(ActionKind::Transfer),
            Err(CodecError::UnexpectedKind {
                expected: ActionKind::Transfer,
                got: ActionKind::Voucher
            })
        );
    }

    #[test]
    fn test_reader_trailing_bytes() {
        let mut w = CanonicalWriter::new();
        w.field_u64(1).field_u64(2);
        let bytes = w.into_bytes();
        let mut r = CanonicalReader::new(&bytes);
        r.field_u64().unwrap();
        assert_eq!(r.finish(), Err(CodecError::TrailingBytes(2)));
    }
}
