use crate::codec::version::Version;
use crate::config::MigrationPolicy;
use log::debug;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::cell::Cell;

/// A name the game replaced, with the first version that no longer uses it.
struct Migration {
    legacy: &'static str,
    current: &'static str,
    renamed_in: Version,
}

const MIGRATIONS: [Migration; 6] = [
    Migration {
        legacy: "raw-wood",
        current: "wood",
        renamed_in: Version::new(0, 17, 0, 0),
    },
    Migration {
        legacy: "science-pack-1",
        current: "automation-science-pack",
        renamed_in: Version::new(0, 17, 0, 0),
    },
    Migration {
        legacy: "science-pack-2",
        current: "logistic-science-pack",
        renamed_in: Version::new(0, 17, 0, 0),
    },
    Migration {
        legacy: "science-pack-3",
        current: "chemical-science-pack",
        renamed_in: Version::new(0, 17, 0, 0),
    },
    Migration {
        legacy: "high-tech-science-pack",
        current: "utility-science-pack",
        renamed_in: Version::new(0, 17, 0, 0),
    },
    Migration {
        legacy: "grass-1",
        current: "landfill",
        renamed_in: Version::new(0, 17, 10, 0),
    },
];

thread_local! {
    static LEGACY_NAMES: Regex = u!(Regex::new(
        r#""(raw-wood|science-pack-1|science-pack-2|science-pack-3|high-tech-science-pack|grass-1)""#
    ));
    static VERSION_FIELD: Regex = u!(Regex::new(r#""version"\s*:\s*(\d+)"#));
}

/// The oldest version declared anywhere in the JSON text, i.e., by the blueprint or by any blueprint of a book.
pub fn declared_version(json: &str) -> Option<Version> {
    VERSION_FIELD.with(|regex| {
        regex
            .captures_iter(json)
            .filter_map(|captures| captures[1].parse::<u64>().ok())
            .map(Version::unpack)
            .min()
    })
}

/// Replaces quoted legacy names in the JSON text by their current names. With `VersionGated`, a name is only replaced
/// when the text declares a version older than the rename or no version at all.
pub fn migrate_names(json: &str, policy: MigrationPolicy) -> Cow<'_, str> {
    let version = match policy {
        MigrationPolicy::Unconditional => None,
        MigrationPolicy::VersionGated => declared_version(json),
    };
    let replaced = Cell::new(0);
    let result = LEGACY_NAMES.with(|regex| {
        regex.replace_all(json, |captures: &Captures| {
            let legacy = &captures[1];
            let migration = MIGRATIONS.iter().find(|migration| migration.legacy == legacy);
            match migration {
                Some(migration) if version.map_or(true, |version| version < migration.renamed_in) => {
                    replaced.set(replaced.get() + 1);
                    format!("\"{}\"", migration.current)
                }
                _ => captures[0].to_string(),
            }
        })
    });
    if replaced.get() > 0 {
        debug!("Migrated {} legacy names.", replaced.get());
    }
    result
}
