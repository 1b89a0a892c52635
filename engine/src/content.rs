use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};

use crate::character::Character;

pub fn builtin_characters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("aria", include_str!("../content/characters/aria.json")),
        ("borin", include_str!("../content/characters/borin.json")),
    ])
}

/// Decode one of the bundled sample characters by id.
pub fn builtin_character(id: &str) -> Result<Character> {
    let text = builtin_characters()
        .get(id.trim().to_lowercase().as_str())
        .copied()
        .ok_or_else(|| anyhow!("no sample character '{}'", id))?;
    serde_json::from_str(text).with_context(|| format!("failed to parse sample character: {}", id))
}
