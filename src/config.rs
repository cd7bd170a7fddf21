use crate::codec::version::Version;
use log::LevelFilter;
use std::ops::RangeInclusive;

pub const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Undo steps kept before the oldest ones are evicted.
pub const MAX_HISTORY_LENGTH: usize = 1000;
/// Undo steps remaining after an eviction.
pub const MIN_HISTORY_LENGTH: usize = 800;

/// Copper wires a power pole may have.
pub const MAX_POLE_CONNECTION_COUNT: usize = 5;

/// First character of every supported blueprint string.
pub const FORMAT_VERSION_TAG: char = '0';

/// Game version written into exported blueprints.
pub const EXPORT_VERSION: Version = Version::new(1, 1, 110, 0);

/// Blueprints older than this get their power pole wires generated on load when they carry none.
pub const POLE_NEIGHBOURS_SINCE: Version = Version::new(1, 1, 11, 0);

/// Number of pumpjacks an oil outpost may be generated for.
pub const OIL_OUTPOST_PUMPJACKS: RangeInclusive<usize> = 2..=200;
/// Free cells kept around the pumpjacks for routing pipes.
pub const PIPE_ROUTING_MARGIN: i32 = 2;
/// Most cells an underground pipe pair spans between its two ends.
pub const MAX_UNDERGROUND_PIPE_GAP: usize = 9;
/// Cells past its own edge a beacon reaches.
pub const BEACON_EFFECT_RADIUS: i32 = 3;
/// Cells past its own cell a medium electric pole supplies.
pub const POLE_SUPPLY_RADIUS: i32 = 3;

/// Choices of the oil outpost generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OilOutpostSettings {
    /// Module put into every slot of the pumpjacks.
    pub pumpjack_module: Option<String>,
    pub beacons: bool,
    pub beacon_module: Option<String>,
    /// Straight pipe runs hiding fewer cells than this stay above ground.
    pub min_gap_between_undergrounds: usize,
    /// Beacons reaching fewer pumpjacks are not placed.
    pub min_affected_entities: usize,
}

impl Default for OilOutpostSettings {
    fn default() -> Self {
        OilOutpostSettings {
            pumpjack_module: Some("productivity-module-3".to_string()),
            beacons: true,
            beacon_module: Some("speed-module-3".to_string()),
            min_gap_between_undergrounds: 1,
            min_affected_entities: 1,
        }
    }
}

/// Runtime options of a document.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Reject moves that would stretch an existing wire beyond its reach.
    pub limit_wire_reach: bool,
    pub max_history_length: usize,
    pub min_history_length: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            limit_wire_reach: true,
            max_history_length: MAX_HISTORY_LENGTH,
            min_history_length: MIN_HISTORY_LENGTH,
        }
    }
}

/// When legacy names are rewritten while decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MigrationPolicy {
    /// Every legacy name is rewritten regardless of the version the blueprint declares.
    #[default]
    Unconditional,
    /// A legacy name is rewritten only in blueprints older than the version that renamed it.
    VersionGated,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub migration_policy: MigrationPolicy,
    pub document: DocumentOptions,
}
