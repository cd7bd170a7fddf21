use crate::catalog::prototypes::{EntityFlag, SignalType};
use crate::catalog::Catalog;
use crate::codec::payload::{BlueprintData, EntityData, IconData, SignalId, TileData};
use crate::codec::version::Version;
use crate::config::{DocumentOptions, EXPORT_VERSION, POLE_NEIGHBOURS_SINCE};
use crate::document::placed_object::{NewObject, ObjectId};
use crate::document::Document;
use crate::geometry::area::{Area, Bounds};
use crate::geometry::direction::Direction;
use crate::geometry::{round_half_up, Point};
use crate::utils::result_utils::ResultUtils;
use crate::wires::compact::{links_from_compact, links_from_wire_list, links_to_compact};
use crate::wires::wire_link::WireColor;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Translation that moves the content of a payload to where the editor keeps it. Payload positions are relative to
/// the center of the blueprint, so the translation is whole cells, plus the fractional part of the left and top edge.
fn load_offset(data: &BlueprintData, catalog: &Catalog) -> Point {
    // Tiles only count in blueprints without an entity list.
    let bounds = match &data.entities {
        Some(entities) => entities
            .iter()
            .filter_map(|entity| {
                let prototype = catalog.entity(&entity.name)?;
                if prototype.has_flag(EntityFlag::PlaceableOffGrid) {
                    return None;
                }
                let (width, height) = prototype.size_for(entity.direction.unwrap_or_default());
                Some(Bounds::of_area(&Area::new(entity.position, width, height)))
            })
            .fold(None, Bounds::extend),
        None => data
            .tiles
            .iter()
            .flatten()
            .map(|tile| Bounds::of_area(&Area::new(tile.position + Point::new(0.5, 0.5), 1, 1)))
            .fold(None, Bounds::extend),
    };

    match bounds {
        Some(Bounds { min, max }) => Point::new(
            -((min.x + max.x) / 2.0).floor() + min.x % 1.0,
            -((min.y + max.y) / 2.0).floor() + min.y % 1.0,
        ),
        None => Point::default(),
    }
}

/// Builds a document from a parsed and validated payload. The history of the result is empty.
pub fn document_from_data(data: BlueprintData, catalog: Rc<Catalog>, options: DocumentOptions) -> Document {
    let offset = load_offset(&data, &catalog);
    let mut document = Document::with_options(catalog.clone(), options);
    document.label = data.label;
    document.description = data.description;
    document.extra = data.extra;
    for icon in data.icons.into_iter().flatten() {
        if let Some(name) = icon.signal.name {
            document.icons.insert(icon.index, name);
        }
    }

    let mut tiles: Vec<(String, Vec<Point>)> = Vec::new();
    for tile in data.tiles.into_iter().flatten() {
        let position = Point::new(
            (tile.position.x + offset.x).floor() + 0.5,
            (tile.position.y + offset.y).floor() + 0.5,
        );
        match tiles.iter_mut().find(|(name, _)| *name == tile.name) {
            Some((_, positions)) => positions.push(position),
            None => tiles.push((tile.name, vec![position])),
        }
    }
    for (name, positions) in tiles {
        if document.create_tiles(&name, &positions) == 0 {
            warn!("Dropped {} tiles of type {} missing in the catalog.", positions.len(), name);
        }
    }

    let entities = data.entities.unwrap_or_default();
    document.start_transaction("Load blueprint");
    for entity in entities.iter() {
        let direction = entity.direction.unwrap_or_default();
        let mut position = entity.position + offset;
        if let Some(prototype) = catalog.entity(&entity.name) {
            if prototype.has_flag(EntityFlag::PlaceableOffGrid) {
                let (width, height) = prototype.size_for(direction);
                let half = Point::new(width as f64 / 2.0, height as f64 / 2.0);
                position = Point::new(
                    round_half_up(entity.position.x + offset.x - half.x) + half.x,
                    round_half_up(entity.position.y + offset.y - half.y) + half.y,
                );
            }
        }
        let new_object = NewObject {
            id: Some(entity.entity_number),
            name: entity.name.clone(),
            position,
            direction,
            direction_type: entity.direction_type,
            settings: entity.settings.clone(),
        };
        document
            .create_object(new_object)
            .warn_if_err("Skipping an entity of the blueprint");
    }

    let mut copper_links = 0;
    let inline_links = entities.iter().flat_map(|entity| {
        links_from_compact(entity.entity_number, entity.connections.as_ref(), entity.neighbours.as_deref())
    });
    let listed_links = links_from_wire_list(data.wires.as_deref().unwrap_or_default());
    for link in inline_links.chain(listed_links) {
        if document.create_wire(link) && link.color() == WireColor::Copper {
            copper_links += 1;
        }
    }
    document.commit_transaction();

    let version = data.version.map(Version::unpack);
    if version.is_some_and(|version| version < POLE_NEIGHBOURS_SINCE) && copper_links == 0 {
        debug!("Generating power pole wires for a blueprint from {}.", version.unwrap_or_default());
        document.generate_power_pole_wires();
    }

    document.reset_history();
    debug!(
        "Loaded blueprint with {} objects, {} tiles and {} wires.",
        document.object_count(),
        document.tiles().count(),
        document.links().count()
    );
    document
}

/// The payload of a document, with positions relative to its center and objects numbered densely from 1 in the order
/// of their ids.
pub fn document_to_data(document: &Document) -> BlueprintData {
    let mut center = document.center();
    // Rails are laid on a two cell grid. The center must keep them on it.
    if let Some(rail) = document.first_rail_position() {
        if (rail.x - center.x) % 2.0 == 0.0 {
            center.x += 1.0;
        }
        if (rail.y - center.y) % 2.0 == 0.0 {
            center.y += 1.0;
        }
    }

    let numbers = document
        .objects()
        .enumerate()
        .map(|(i, object)| (object.id, ObjectId(i as u32 + 1)))
        .collect::<FxHashMap<_, _>>();
    let renumber = |id: ObjectId| numbers.get(&id).copied();
    let view = document.view();

    let entities = document
        .objects()
        .filter_map(|object| {
            let entity_number = renumber(object.id)?;
            let links = document.connections(object.id);
            let (connections, neighbours) = links_to_compact(object.id, &links, &view, renumber);
            Some(EntityData {
                entity_number,
                name: object.name.clone(),
                position: object.position - center,
                direction: (object.direction != Direction::North).then_some(object.direction),
                direction_type: object.direction_type,
                connections,
                neighbours,
                settings: object.settings.clone(),
            })
        })
        .collect::<Vec<_>>();

    let tiles = document
        .tiles()
        .map(|tile| TileData {
            name: tile.name.clone(),
            position: Point::new(
                tile.position.x.floor() - center.x.floor(),
                tile.position.y.floor() - center.y.floor(),
            ),
        })
        .collect::<Vec<_>>();

    let icon_names = if document.icons.is_empty() {
        document.generated_icons()
    } else {
        document.icons.clone()
    };
    let catalog = document.catalog();
    let icons = icon_names
        .into_iter()
        .map(|(index, name)| IconData {
            index,
            signal: SignalId {
                kind: Some(catalog.signal_type(&name).unwrap_or(SignalType::Item)),
                name: Some(name),
            },
        })
        .collect::<Vec<_>>();

    BlueprintData {
        label: document.label.clone(),
        description: document.description.clone(),
        icons: (!icons.is_empty()).then_some(icons),
        entities: (!entities.is_empty()).then_some(entities),
        tiles: (!tiles.is_empty()).then_some(tiles),
        version: Some(EXPORT_VERSION.pack()),
        extra: document.extra.clone(),
        ..BlueprintData::default()
    }
}
