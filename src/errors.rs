use crate::codec::validation::ValidationIssue;
use crate::document::placed_object::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("the blueprint string is corrupted: {0}")]
    CorruptedString(String),
    #[error("the blueprint does not match the schema: {}", describe_issues(.0))]
    SchemaInvalid(Vec<ValidationIssue>),
    #[error("the blueprint contains modded content: {}", .0.join(", "))]
    ModdedContent(Vec<String>),
    #[error("blueprints with trains are not supported")]
    UnsupportedTrainContent,
    #[error("the blueprint book does not contain any blueprints")]
    EmptyDocumentSet,
    #[error("failed to compress the blueprint: {0}")]
    Encoding(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("unknown entity type {0}")]
    UnknownType(String),
    #[error("object {0} does not exist")]
    UnknownObject(ObjectId),
    #[error("{0} can not be flipped")]
    IllegalFlip(String),
    #[error("an oil outpost needs between 2 and 200 pumpjacks, found {0}")]
    PumpjackCount(usize),
    #[error("an oil outpost area may only contain pumpjacks")]
    NotOnlyPumpjacks,
}

fn describe_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
