//! Placeholder contact generation using curated name lists.
//!
//! Provides plausible lead names and Colombian-format phone numbers
//! for generated notes. All generation flows through a RandomSource
//! (same seed = same contacts).

use crate::rng::RandomSource;

/// Placeholder contact generator using curated name lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last)
    pub fn generate_full_name<R: RandomSource>(rng: &mut R) -> String {
        let first_name = Self::generate_first_name(rng);
        let last_name = Self::generate_last_name(rng);
        format!("{} {}", first_name, last_name)
    }

    /// Generate first name from curated list
    pub fn generate_first_name<R: RandomSource>(rng: &mut R) -> &'static str {
        *rng.pick(Self::first_names())
    }

    /// Generate last name from curated list
    pub fn generate_last_name<R: RandomSource>(rng: &mut R) -> &'static str {
        *rng.pick(Self::last_names())
    }

    /// Full phone number, e.g. `+57 312 845 3391`.
    pub fn generate_phone<R: RandomSource>(rng: &mut R) -> String {
        format!(
            "+57 {} {} {}",
            rng.next_in_range(300, 320),
            rng.next_in_range(100, 999),
            rng.next_in_range(1000, 9999)
        )
    }

    /// Pre-masked phone shown in drill-down rows, e.g. `+57•••4821`.
    pub fn generate_masked_phone<R: RandomSource>(rng: &mut R) -> String {
        format!("+57•••{}", rng.next_in_range(1000, 9999))
    }

    /// Split a lead name into (first, last), filling gaps from the lists.
    pub fn split_or_generate<R: RandomSource>(lead: &str, rng: &mut R) -> (String, String) {
        let mut parts = lead.split_whitespace();
        let first = match parts.next() {
            Some(first) => first.to_string(),
            None => Self::generate_first_name(rng).to_string(),
        };
        let last = match parts.next() {
            Some(last) => last.to_string(),
            None => Self::generate_last_name(rng).to_string(),
        };
        (first, last)
    }

    /// Curated list of first names
    pub fn first_names() -> &'static [&'static str] {
        &[
            "María", "Carlos", "Ana", "Luis", "Sofia", "Juan", "Laura", "Pedro", "Carmen",
            "Diego", "Isabella", "Miguel", "Valentina", "Andrés", "Camila",
        ]
    }

    /// Curated list of last names
    pub fn last_names() -> &'static [&'static str] {
        &[
            "García", "Rodríguez", "López", "Martínez", "González", "Pérez", "Sánchez",
            "Ramírez", "Torres", "Flores",
        ]
    }
}
