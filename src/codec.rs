pub mod conversion;
pub mod migrations;
pub mod payload;
pub mod validation;
pub mod version;

use crate::book::DocumentSet;
use crate::catalog::Catalog;
use crate::codec::conversion::{document_from_data, document_to_data};
use crate::codec::migrations::migrate_names;
use crate::codec::payload::Payload;
use crate::codec::validation::{classify, validate, Keyword, ValidationIssue};
use crate::config::{CodecOptions, MigrationPolicy, FORMAT_VERSION_TAG};
use crate::document::Document;
use crate::errors::CodecError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::rc::Rc;

/// Content of a decoded blueprint string.
pub enum Decoded {
    Document(Document),
    DocumentSet(DocumentSet),
}

/// Serializes, compresses and tags the payload.
pub fn encode_payload(payload: &Payload) -> Result<String, CodecError> {
    let json = serde_json::to_string(payload).map_err(|e| CodecError::Encoding(e.into()))?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(json.as_bytes())?;
    let compressed = encoder.finish()?;
    let mut result = String::with_capacity(compressed.len() * 4 / 3 + 4);
    result.push(FORMAT_VERSION_TAG);
    STANDARD.encode_string(compressed, &mut result);
    debug!("Encoded {} bytes of JSON into {} characters.", json.len(), result.len());
    Ok(result)
}

/// Decodes a blueprint string into its payload. Legacy names are migrated before the payload is validated against the
/// catalog.
pub fn decode_payload(text: &str, catalog: &Catalog, policy: MigrationPolicy) -> Result<Payload, CodecError> {
    let encoded = text
        .trim()
        .strip_prefix(FORMAT_VERSION_TAG)
        .ok_or_else(|| CodecError::CorruptedString("unsupported version tag".to_string()))?;
    let compressed = STANDARD
        .decode(encoded)
        .map_err(|e| CodecError::CorruptedString(e.to_string()))?;
    let mut json = String::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_string(&mut json)
        .map_err(|e| CodecError::CorruptedString(e.to_string()))?;
    debug!("Decompressed {} bytes of JSON.", json.len());

    let json = migrate_names(&json, policy);
    let value: Value = serde_json::from_str(&json).map_err(|e| CodecError::CorruptedString(e.to_string()))?;

    let issues = validate(&value, catalog);
    if !issues.is_empty() {
        return Err(classify(issues));
    }

    Payload::deserialize(&value).map_err(|e| {
        CodecError::SchemaInvalid(vec![ValidationIssue {
            path: String::new(),
            keyword: Keyword::Type,
            data: Value::String(e.to_string()),
        }])
    })
}

/// Decodes a blueprint string into a document or a set of documents.
pub fn decode(text: &str, catalog: Rc<Catalog>, options: CodecOptions) -> Result<Decoded, CodecError> {
    match decode_payload(text, &catalog, options.migration_policy)? {
        Payload::Blueprint(data) => Ok(Decoded::Document(document_from_data(data, catalog, options.document))),
        Payload::BlueprintBook(data) => Ok(Decoded::DocumentSet(DocumentSet::new(data, catalog, options.document)?)),
    }
}

pub fn encode_document(document: &Document) -> Result<String, CodecError> {
    encode_payload(&Payload::Blueprint(document_to_data(document)))
}

/// Encodes the set, writing its active document back into it first.
pub fn encode_document_set(set: &mut DocumentSet) -> Result<String, CodecError> {
    encode_payload(&Payload::BlueprintBook(set.serialize()))
}
