use std::collections::HashMap;
use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Expert => "Expert",
        }
    }
}

/// Reference definition of a movement. Presentation data only; evaluation is
/// keyed on `id` through the movement registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub requirements: Vec<String>,
    pub muscles: Vec<String>,
}

pub trait MovementCatalog {
    fn lookup(&self, id: &str) -> Option<&Movement>;
}

/// In-memory catalog, either the built-in set or one loaded from JSON.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    movements: Vec<Movement>,
    index: HashMap<String, usize>,
}

impl StaticCatalog {
    pub fn new(movements: Vec<Movement>) -> Self {
        let index = movements
            .iter()
            .enumerate()
            .map(|(i, movement)| (movement.id.clone(), i))
            .collect();
        Self { movements, index }
    }

    /// Reads a JSON array of movements.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
        let movements: Vec<Movement> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid catalog JSON in {}", path.display()))?;
        Ok(Self::new(movements))
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            movement(
                "jade-split",
                "Jade Split",
                Difficulty::Advanced,
                "An advanced split position on the pole combining flexibility and strength, where one leg is hooked on the pole while the other extends into a split.",
                &[
                    "Advanced flexibility (splits)",
                    "Strong pole grip",
                    "Core control",
                    "Hip flexor flexibility",
                    "Shoulder stability",
                ],
                &["Hip flexors", "Hamstrings", "Core", "Shoulders", "Inner thighs"],
            ),
            movement(
                "twerk",
                "Pole Twerk",
                Difficulty::Intermediate,
                "A dynamic movement combining pole grip with isolated hip and glute movements, creating a fluid twerking motion while maintaining pole contact.",
                &[
                    "Hip mobility",
                    "Core control",
                    "Basic pole grip",
                    "Rhythm coordination",
                    "Lower body isolation",
                ],
                &["Glutes", "Core", "Quadriceps", "Lower back", "Hip flexors"],
            ),
            movement(
                "allegra",
                "Allegra",
                Difficulty::Advanced,
                "A split-based move where the body is suspended sideways on the pole, with one leg extended to the ceiling.",
                &[
                    "Split flexibility",
                    "Strong upper body strength",
                    "Advanced pole grip",
                    "Core stability",
                    "Balance control",
                ],
                &["Shoulders", "Lats", "Core", "Hip flexors", "Obliques"],
            ),
            movement(
                "spatchcock",
                "Spatchcock",
                Difficulty::Expert,
                "An extreme flexibility move where both legs are pushed behind the head while gripping the pole.",
                &[
                    "Extreme flexibility",
                    "Advanced upper body strength",
                    "Strong core control",
                    "Advanced pole grip",
                    "Shoulder mobility",
                ],
                &["Shoulders", "Core", "Upper back", "Hip flexors", "Chest"],
            ),
            movement(
                "fireman-spin",
                "Fireman Spin",
                Difficulty::Beginner,
                "A basic spin around the pole using both hands and legs, for learning pole grip and spinning mechanics.",
                &["Upper body strength", "Basic grip strength", "Core engagement"],
                &["Arms", "Core", "Thighs", "Shoulders"],
            ),
        ])
    }
}

impl MovementCatalog for StaticCatalog {
    fn lookup(&self, id: &str) -> Option<&Movement> {
        self.index.get(id).map(|&i| &self.movements[i])
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn movement(
    id: &str,
    name: &str,
    difficulty: Difficulty,
    description: &str,
    requirements: &[&str],
    muscles: &[&str],
) -> Movement {
    Movement {
        id: id.to_string(),
        name: name.to_string(),
        difficulty,
        description: description.to_string(),
        requirements: requirements.iter().map(|s| s.to_string()).collect(),
        muscles: muscles.iter().map(|s| s.to_string()).collect(),
    }
}
