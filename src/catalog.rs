pub mod prototypes;
#[cfg(test)]
pub mod fixture;

use crate::catalog::prototypes::{EntityPrototype, ItemPrototype, RecipePrototype, SignalType, TilePrototype};
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to parse the catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("prototype {0} is defined more than once")]
    Duplicate(String),
}

#[derive(Deserialize)]
struct CatalogData {
    #[serde(default)]
    entities: Vec<EntityPrototype>,
    #[serde(default)]
    items: Vec<ItemPrototype>,
    #[serde(default)]
    recipes: Vec<RecipePrototype>,
    #[serde(default)]
    fluids: Vec<String>,
    #[serde(default)]
    tiles: Vec<TilePrototype>,
    #[serde(default)]
    signals: Vec<String>,
}

/// Read-only game data: what may be placed, what it looks like on the grid and which names are valid.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: FxHashMap<String, EntityPrototype>,
    items: FxHashMap<String, ItemPrototype>,
    recipes: FxHashMap<String, RecipePrototype>,
    fluids: FxHashSet<String>,
    tiles: FxHashMap<String, TilePrototype>,
    signals: FxHashSet<String>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        let mut catalog = Catalog::default();
        for entity in data.entities {
            if catalog.entities.contains_key(&entity.name) {
                return Err(CatalogError::Duplicate(entity.name));
            }
            catalog = catalog.with_entity(entity);
        }
        for item in data.items {
            if catalog.items.contains_key(&item.name) {
                return Err(CatalogError::Duplicate(item.name));
            }
            catalog = catalog.with_item(item);
        }
        for recipe in data.recipes {
            catalog = catalog.with_recipe(recipe);
        }
        for tile in data.tiles {
            catalog = catalog.with_tile(tile);
        }
        catalog.fluids.extend(data.fluids);
        catalog.signals.extend(data.signals);
        debug!(
            "Loaded a catalog with {} entities, {} items, {} recipes and {} tiles.",
            catalog.entities.len(),
            catalog.items.len(),
            catalog.recipes.len(),
            catalog.tiles.len()
        );
        Ok(catalog)
    }

    pub fn with_entity(mut self, entity: EntityPrototype) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn with_item(mut self, item: ItemPrototype) -> Self {
        self.items.insert(item.name.clone(), item);
        self
    }

    pub fn with_recipe(mut self, recipe: RecipePrototype) -> Self {
        self.recipes.insert(recipe.name.clone(), recipe);
        self
    }

    pub fn with_tile(mut self, tile: TilePrototype) -> Self {
        self.tiles.insert(tile.name.clone(), tile);
        self
    }

    pub fn with_fluid(mut self, name: &str) -> Self {
        self.fluids.insert(name.to_string());
        self
    }

    pub fn with_signal(mut self, name: &str) -> Self {
        self.signals.insert(name.to_string());
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntityPrototype> {
        self.entities.get(name)
    }

    pub fn item(&self, name: &str) -> Option<&ItemPrototype> {
        self.items.get(name)
    }

    pub fn recipe(&self, name: &str) -> Option<&RecipePrototype> {
        self.recipes.get(name)
    }

    pub fn tile(&self, name: &str) -> Option<&TilePrototype> {
        self.tiles.get(name)
    }

    pub fn recipes(&self) -> impl Iterator<Item = &RecipePrototype> {
        self.recipes.values()
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn has_recipe(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn has_tile(&self, name: &str) -> bool {
        self.tiles.contains_key(name)
    }

    pub fn is_fluid(&self, name: &str) -> bool {
        self.fluids.contains(name)
    }

    pub fn is_signal(&self, name: &str) -> bool {
        self.signals.contains(name)
    }

    /// Signal type under which `name` is referenced in icons and circuit conditions.
    pub fn signal_type(&self, name: &str) -> Option<SignalType> {
        if self.items.contains_key(name) {
            Some(SignalType::Item)
        } else if self.fluids.contains(name) {
            Some(SignalType::Fluid)
        } else if self.signals.contains(name) {
            Some(SignalType::Virtual)
        } else {
            None
        }
    }

    pub fn accepts_recipe(&self, entity: &EntityPrototype, recipe: &str) -> bool {
        self.recipes
            .get(recipe)
            .is_some_and(|recipe| entity.crafting_categories.contains(&recipe.category))
    }

    /// Whether the module fits into the entity and, if given, is allowed for the recipe it crafts.
    pub fn accepts_module(&self, entity: &EntityPrototype, module: &str, recipe: Option<&str>) -> bool {
        if entity.module_slots == 0 {
            return false;
        }
        let Some(module) = self.items.get(module).and_then(|item| item.module.as_ref()) else {
            return false;
        };
        let effects_allowed = entity.allowed_effects.is_empty()
            || module.effects.iter().all(|effect| entity.allowed_effects.contains(effect));
        let recipe_allowed = !module.effects.iter().any(|effect| effect == "productivity")
            || recipe.map_or(true, |recipe| self.recipes.get(recipe).is_some_and(|r| r.allow_productivity));
        effects_allowed && recipe_allowed
    }
}
