//! Flat state actions.
//!
//! An [`ActionRecord`] is the common shape of every ledger-mutating payload
//! that carries no structure of its own: a kind tag, a creation time, a
//! canonical object body and the authorizations over all of that.
//!
//! ## Wire format
//!
//! ```text
//! varint(kind) || varint(version) || [timestamp] || [body] || [authorizations]
//! ```
//!
//! The signable bytes are the same encoding without the authorizations
//! field.

use serde_json::{json, Value as JsonValue};

use cairn_auth::{AuthorizationEnvelope, MultiAuthorization, Signable, Signer};
use cairn_core::{
    ActionKind, CanonicalDecode, CanonicalReader, CanonicalValue, CanonicalWriter, CodecError,
    StateAction, ValidationError, MAX_DEPTH,
};

use crate::error::{LedgerError, Result};

/// Current encoding version of [`ActionRecord`].
pub const ACTION_RECORD_VERSION: u64 = 1;

/// A signed, flat state action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub version: u64,
    /// Creation time in Unix milliseconds.
    pub timestamp: u64,
    /// Canonical object carrying the kind-specific fields.
    pub body: CanonicalValue,
    authorizations: MultiAuthorization,
}

impl ActionRecord {
    /// An unsigned record at the current version.
    pub fn new(kind: ActionKind, timestamp: u64, body: CanonicalValue) -> Self {
        Self {
            kind,
            version: ACTION_RECORD_VERSION,
            timestamp,
            body,
            authorizations: MultiAuthorization::new(),
        }
    }

    /// Start building a record of `kind`.
    pub fn builder(kind: ActionKind) -> ActionBuilder {
        ActionBuilder::new(kind)
    }

    pub fn authorizations(&self) -> &MultiAuthorization {
        &self.authorizations
    }

    /// Authorize this record with `signer`, replacing any earlier
    /// authorization from the same moniker.
    pub async fn sign(&mut self, signer: &dyn Signer) -> Result<()> {
        let envelope = AuthorizationEnvelope::sign(&*self, signer).await?;
        self.authorizations.insert(envelope);
        Ok(())
    }

    fn unsigned_writer(&self) -> CanonicalWriter {
        let mut w = CanonicalWriter::with_header(self.kind, self.version);
        w.field_u64(self.timestamp).field_value(&self.body);
        w
    }

    /// Parse the debug projection produced by [`StateAction::to_json`].
    ///
    /// `version` defaults to the current version and `authorizations` to
    /// none when absent.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| LedgerError::InvalidJson("expected object".into()))?;

        let kind: ActionKind = map
            .get("kind")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| LedgerError::InvalidJson("kind must be a string".into()))?
            .parse()?;
        let version = match map.get("version") {
            None => ACTION_RECORD_VERSION,
            Some(v) => v
                .as_u64()
                .ok_or_else(|| LedgerError::InvalidJson("version must be an integer".into()))?,
        };
        let timestamp = map
            .get("timestamp")
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| LedgerError::InvalidJson("timestamp must be an integer".into()))?;
        let body = match map.get("body") {
            Some(body) => CanonicalValue::from_json(body)?,
            None => CanonicalValue::Object(Vec::new()),
        };
        let authorizations = match map.get("authorizations") {
            Some(auths) => MultiAuthorization::from_json(auths)?,
            None => MultiAuthorization::new(),
        };

        Ok(Self {
            kind,
            version,
            timestamp,
            body,
            authorizations,
        })
    }
}

impl Signable for ActionRecord {
    fn signable_bytes(&self) -> Vec<u8> {
        self.unsigned_writer().into_bytes()
    }
}

impl StateAction for ActionRecord {
    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = self.unsigned_writer();
        w.field_bytes(&self.authorizations.to_canonical_bytes());
        w.into_bytes()
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "kind": self.kind.as_str(),
            "version": self.version,
            "timestamp": self.timestamp,
            "body": self.body.to_json(),
            "authorizations": self.authorizations.to_json(),
        })
    }

    /// Requires at least one authorization and every authorization valid.
    fn is_valid(&self) -> std::result::Result<(), ValidationError> {
        if self.version == 0 {
            return Err(ValidationError::InvalidVersion(self.version));
        }
        if self.version > ACTION_RECORD_VERSION {
            return Err(ValidationError::UnsupportedVersion(self.version));
        }
        if self.kind.is_block() {
            return Err(ValidationError::UnsupportedKind(self.kind));
        }
        if self.timestamp == 0 {
            return Err(ValidationError::InvalidTimestamp(self.timestamp));
        }
        if !self.body.is_object() {
            return Err(ValidationError::InvalidBody("body must be an object".into()));
        }
        if self.body.depth() > MAX_DEPTH {
            return Err(ValidationError::InvalidBody(format!(
                "body nested deeper than {MAX_DEPTH}"
            )));
        }
        if self.authorizations.is_empty() {
            return Err(ValidationError::MissingAuthorization);
        }
        self.authorizations.verify(self)
    }
}

impl CanonicalDecode for ActionRecord {
    fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let kind = ActionKind::from_u64(r.read_varint()?)?;
        if kind.is_block() {
            return Err(CodecError::Malformed(format!("{kind} is not a flat state action")));
        }
        let version = r.read_varint()?;
        let timestamp = r.field_u64()?;
        let body = r.field_value()?;
        let authorizations = MultiAuthorization::from_canonical_bytes(r.field_bytes()?)?;
        r.finish()?;

        Ok(Self {
            kind,
            version,
            timestamp,
            body,
            authorizations,
        })
    }
}

/// Builder for [`ActionRecord`]s. Body fields keep the order they are added.
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    kind: ActionKind,
    timestamp: u64,
    fields: Vec<(String, CanonicalValue)>,
}

impl ActionBuilder {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            timestamp: 0,
            fields: Vec::new(),
        }
    }

    pub fn timestamp(mut self, ts: u64) -> Self {
        self.timestamp = ts;
        self
    }

    /// Append a body field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<CanonicalValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// The unsigned record.
    pub fn build(self) -> ActionRecord {
        ActionRecord::new(self.kind, self.timestamp, CanonicalValue::Object(self.fields))
    }

    /// Build and sign with `signer`.
    pub async fn sign(self, signer: &dyn Signer) -> Result<ActionRecord> {
        let mut record = self.build();
        record.sign(signer).await?;
        Ok(record)
    }
}
