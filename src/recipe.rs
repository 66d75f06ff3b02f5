//! Named body constructors.
//!
//! Levels refer to entity kinds by name; the [`RecipeBook`] maps each
//! name to a plain function that builds the body. Registration is
//! explicit, so the set of spawnable kinds is visible in one place and
//! an unknown name is an ordinary error instead of a lookup into thin
//! air.

use std::collections::HashMap;

use crate::math::Vec2;
use crate::physics::{Body, Stats};

/// The level-file side of a spawn: where, how big, and the gameplay
/// numbers the recipe may care about.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnSpec {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub score: i32,
    pub hurts_player: bool,
}

impl Default for SpawnSpec {
    fn default() -> Self {
        SpawnSpec {
            pos: Vec2::new(0, 0),
            size: Vec2::new(16, 16),
            health: 100,
            score: 0,
            hurts_player: false,
        }
    }
}

impl SpawnSpec {
    pub fn at(pos: Vec2, size: Vec2) -> Self {
        SpawnSpec {
            pos,
            size,
            ..Self::default()
        }
    }

    fn stats(&self) -> Stats {
        Stats {
            health: self.health,
            score: self.score,
        }
    }
}

/// A recipe builds one body from a spawn spec.
pub type Recipe = fn(&SpawnSpec) -> Body;

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("no recipe registered for kind `{0}`")]
    UnknownKind(String),
}

/// The registry of spawnable kinds.
pub struct RecipeBook {
    recipes: HashMap<String, Recipe>,
}

impl RecipeBook {
    /// An empty book with nothing registered.
    pub fn new() -> Self {
        RecipeBook {
            recipes: HashMap::new(),
        }
    }

    /// A book with the built-in kinds: `prop`, `faller` and `player`.
    pub fn with_defaults() -> Self {
        let mut book = Self::new();
        book.register("prop", |spec| {
            Body::new_inert(spec.pos, spec.size)
                .with_stats(spec.stats())
                .with_hurts_player(spec.hurts_player)
        });
        book.register("faller", |spec| {
            Body::new_falling(spec.pos, spec.size)
                .with_stats(spec.stats())
                .with_hurts_player(spec.hurts_player)
        });
        book.register("player", |spec| {
            Body::new_player(spec.pos, spec.size).with_stats(spec.stats())
        });
        book
    }

    /// Register a kind, replacing any previous recipe under that name.
    pub fn register(&mut self, kind: impl Into<String>, recipe: Recipe) {
        let kind = kind.into();
        if self.recipes.insert(kind.clone(), recipe).is_some() {
            log::warn!("recipe for `{kind}` replaced");
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.recipes.contains_key(kind)
    }

    /// Build a body of the named kind.
    pub fn spawn(&self, kind: &str, spec: &SpawnSpec) -> Result<Body, RecipeError> {
        match self.recipes.get(kind) {
            Some(recipe) => Ok(recipe(spec)),
            None => Err(RecipeError::UnknownKind(kind.to_string())),
        }
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::with_defaults()
    }
}
