mod beacons;
mod pipes;
mod poles;

use crate::config::{OilOutpostSettings, OIL_OUTPOST_PUMPJACKS};
use crate::document::generators::beacons::plan_beacons;
use crate::document::generators::pipes::{plan_pipes, Pumpjack};
use crate::document::generators::poles::plan_poles;
use crate::document::placed_object::{NewObject, ObjectId};
use crate::document::Document;
use crate::errors::DocumentError;
use crate::utils::result_utils::ResultUtils;
use log::{debug, info};

const PUMPJACK: &str = "pumpjack";
const PIPE: &str = "pipe";
const UNDERGROUND_PIPE: &str = "pipe-to-ground";
const BEACON: &str = "beacon";
const POWER_POLE: &str = "medium-electric-pole";

/// What an oil outpost generation added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OilOutpostSummary {
    pub pipes: usize,
    pub underground_pipes: usize,
    /// Cells of straight pipe runs taken over by underground pipes.
    pub replaced_pipes: usize,
    pub beacons: usize,
    pub poles: usize,
    /// Pumpjacks no pipe could reach. They keep their direction.
    pub unconnected_pumpjacks: usize,
}

impl Document {
    /// Turns a blueprint made only of pumpjacks into an oil outpost. A pipe network joins the pumpjacks, optional
    /// beacons surround them, medium power poles supply everything and get wired together, and the pumpjacks are turned
    /// towards the network. All of it is a single undo step.
    pub fn generate_oil_outpost(&mut self, settings: &OilOutpostSettings) -> Result<OilOutpostSummary, DocumentError> {
        let pumpjacks = self
            .objects()
            .filter(|object| object.name == PUMPJACK)
            .map(|object| Pumpjack {
                id: object.id,
                middle: object.position.floor(),
            })
            .collect::<Vec<_>>();
        if !OIL_OUTPOST_PUMPJACKS.contains(&pumpjacks.len()) {
            return Err(DocumentError::PumpjackCount(pumpjacks.len()));
        }
        if pumpjacks.len() != self.object_count() {
            return Err(DocumentError::NotOnlyPumpjacks);
        }
        let catalog = self.catalog().clone();
        let required = [PIPE, UNDERGROUND_PIPE, POWER_POLE]
            .into_iter()
            .chain(settings.beacons.then_some(BEACON));
        for name in required {
            if !catalog.has_entity(name) {
                return Err(DocumentError::UnknownType(name.to_string()));
            }
        }
        let pole_reach = catalog.entity(POWER_POLE).map_or(0.0, |pole| pole.max_wire_distance);

        let layout = plan_pipes(&pumpjacks, settings.min_gap_between_undergrounds);
        let pipe_cells = layout.cells().collect::<Vec<_>>();
        let middles = pumpjacks.iter().map(|pumpjack| pumpjack.middle).collect::<Vec<_>>();
        let beacons = if settings.beacons {
            plan_beacons(&middles, &pipe_cells, settings.min_affected_entities)
        } else {
            Vec::new()
        };
        let consumers = middles.iter().chain(beacons.iter()).copied().collect::<Vec<_>>();
        let poles = plan_poles(&consumers, &pipe_cells, pole_reach);

        self.start_transaction("Generate oil outpost");
        for &cell in layout.pipes.iter() {
            self.create_generated(NewObject::new(PIPE, cell.center()));
        }
        for &(cell, direction) in layout.undergrounds.iter() {
            self.create_generated(NewObject::new(UNDERGROUND_PIPE, cell.center()).facing(direction));
        }
        for &cell in beacons.iter() {
            if let Some(id) = self.create_generated(NewObject::new(BEACON, cell.center())) {
                self.fill_modules(id, settings.beacon_module.as_deref());
            }
        }
        for &cell in poles.iter() {
            self.create_generated(NewObject::new(POWER_POLE, cell.center()));
        }
        self.generate_power_pole_wires();
        for &(id, direction) in layout.outputs.iter() {
            self.set_direction(id, direction);
            self.fill_modules(id, settings.pumpjack_module.as_deref());
        }
        self.commit_transaction();

        let summary = OilOutpostSummary {
            pipes: layout.pipes.len(),
            underground_pipes: layout.undergrounds.len(),
            replaced_pipes: layout.replaced,
            beacons: beacons.len(),
            poles: poles.len(),
            unconnected_pumpjacks: layout.unconnected.len(),
        };
        info!(
            "Generated an oil outpost for {} pumpjacks with {} pipes, {} underground pipes, {} beacons and {} poles.",
            pumpjacks.len(),
            summary.pipes,
            summary.underground_pipes,
            summary.beacons,
            summary.poles
        );
        Ok(summary)
    }

    fn create_generated(&mut self, new_object: NewObject) -> Option<ObjectId> {
        self.create_object(new_object)
            .warn_if_err("Skipping a generated object")
    }

    /// Puts the module into every slot of the object.
    fn fill_modules(&mut self, id: ObjectId, module: Option<&str>) {
        let Some(module) = module else {
            return;
        };
        let slots = self
            .object(id)
            .and_then(|object| self.catalog().entity(&object.name))
            .map_or(0, |prototype| prototype.module_slots as usize);
        if !self.set_modules(id, &vec![module.to_string(); slots]) {
            debug!("Modules of object {} stay as they were.", id);
        }
    }
}
