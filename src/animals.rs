//! Static animal registry.
//!
//! The 25 traditional animals, each owning a disjoint block of 4 numbers
//! from 1 to 100. The registry is immutable reference data; bets and draws
//! resolve animals against it, never against a snapshot copy.

use crate::errors::{BichoError, BichoResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Numbers covered by the registry, inclusive.
pub const MIN_NUMBER: u32 = 1;
pub const MAX_NUMBER: u32 = 100;

/// One animal entry: a block of 4 numbers and a payout multiplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Animal {
    pub id: u32,
    pub name: String,
    pub numbers: Vec<u32>,
    pub multiplier: u64,
    pub icon: String,
}

static REGISTRY: Lazy<Vec<Animal>> = Lazy::new(|| {
    let entries: [(u32, &str, [u32; 4], &str); 25] = [
        (1, "Avestruz", [1, 2, 3, 4], "https://images.unsplash.com/photo-1575550959106-5a7defe28b56?auto=format&fit=crop&q=80&w=200"),
        (2, "Águia", [5, 6, 7, 8], "🦅"),
        (3, "Burro", [9, 10, 11, 12], "https://images.unsplash.com/photo-1534445331316-01582e0e56e4?auto=format&fit=crop&q=80&w=200"),
        (4, "Borboleta", [13, 14, 15, 16], "🦋"),
        (5, "Cachorro", [17, 18, 19, 20], "🐕"),
        (6, "Cabra", [21, 22, 23, 24], "🐐"),
        (7, "Carneiro", [25, 26, 27, 28], "🐑"),
        (8, "Camelo", [29, 30, 31, 32], "🐪"),
        (9, "Cobra", [33, 34, 35, 36], "🐍"),
        (10, "Coelho", [37, 38, 39, 40], "🐇"),
        (11, "Cavalo", [41, 42, 43, 44], "🐎"),
        (12, "Elefante", [45, 46, 47, 48], "🐘"),
        (13, "Galo", [49, 50, 51, 52], "🐓"),
        (14, "Gato", [53, 54, 55, 56], "🐈"),
        (15, "Jacaré", [57, 58, 59, 60], "🐊"),
        (16, "Leão", [61, 62, 63, 64], "🦁"),
        (17, "Macaco", [65, 66, 67, 68], "🐒"),
        (18, "Porco", [69, 70, 71, 72], "🐷"),
        (19, "Pavão", [73, 74, 75, 76], "🦚"),
        (20, "Peru", [77, 78, 79, 80], "🦃"),
        (21, "Touro", [81, 82, 83, 84], "🐂"),
        (22, "Tigre", [85, 86, 87, 88], "🐅"),
        (23, "Urso", [89, 90, 91, 92], "🐻"),
        (24, "Veado", [93, 94, 95, 96], "🦌"),
        (25, "Vaca", [97, 98, 99, 100], "🐄"),
    ];

    entries
        .into_iter()
        .map(|(id, name, numbers, icon)| Animal {
            id,
            name: name.to_string(),
            numbers: numbers.to_vec(),
            multiplier: 18,
            icon: icon.to_string(),
        })
        .collect()
});

/// The full registry, in id order.
pub fn registry() -> &'static [Animal] {
    &REGISTRY
}

/// Look up an animal by id.
pub fn animal_by_id(id: u32) -> Option<&'static Animal> {
    REGISTRY.iter().find(|a| a.id == id)
}

/// Resolve the animal owning a drawn number.
pub fn animal_for_number(number: u32) -> Option<&'static Animal> {
    REGISTRY.iter().find(|a| a.numbers.contains(&number))
}

/// Verify that the animal numbers partition 1..=100 exactly once.
///
/// Called at store startup; a violation means the build shipped malformed
/// reference data and every draw would be undefined, so fail fast.
pub fn validate_registry(animals: &[Animal]) -> BichoResult<()> {
    let mut ids = HashSet::new();
    let mut seen = HashSet::new();

    for animal in animals {
        if !ids.insert(animal.id) {
            return Err(BichoError::RegistryViolation(format!(
                "duplicate animal id {}",
                animal.id
            )));
        }
        if animal.multiplier == 0 {
            return Err(BichoError::RegistryViolation(format!(
                "animal {} has zero multiplier",
                animal.name
            )));
        }
        if animal.numbers.len() != 4 {
            return Err(BichoError::RegistryViolation(format!(
                "animal {} owns {} numbers, expected 4",
                animal.name,
                animal.numbers.len()
            )));
        }
        for &n in &animal.numbers {
            if !(MIN_NUMBER..=MAX_NUMBER).contains(&n) {
                return Err(BichoError::RegistryViolation(format!(
                    "number {} out of range on animal {}",
                    n, animal.name
                )));
            }
            if !seen.insert(n) {
                return Err(BichoError::RegistryViolation(format!(
                    "number {} owned by more than one animal",
                    n
                )));
            }
        }
    }

    if seen.len() != (MAX_NUMBER - MIN_NUMBER + 1) as usize {
        return Err(BichoError::RegistryViolation(format!(
            "registry covers {} numbers, expected {}",
            seen.len(),
            MAX_NUMBER - MIN_NUMBER + 1
        )));
    }

    Ok(())
}
