//! Deduplication of input texts
//!
//! Texts are compared by their [`NormalizedKey`]. A [`DedupPlan`] stores every
//! distinct text once (the first occurrence, in first-seen order) and keeps,
//! for each original position, the index of the unique slot it maps to. The
//! plan is then used to fan the unique vectors back out to the original order.

mod normalizer;

pub use normalizer::{NormalizedKey, normalize_optional, normalize_text};

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A distinct text that will actually be embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueText {
    /// First original text observed for this key
    pub text: String,

    /// Normalized key shared by every duplicate
    pub key: NormalizedKey,
}

/// Arena of unique texts plus the position-to-slot mapping of the input
#[derive(Debug, Clone, Default)]
pub struct DedupPlan {
    unique: Vec<UniqueText>,
    positions: Vec<usize>,
}

impl DedupPlan {
    /// Build a plan for `texts`, preserving first-seen order
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut slots: HashMap<NormalizedKey, usize> = HashMap::with_capacity(texts.len());
        let mut unique = Vec::new();
        let mut positions = Vec::with_capacity(texts.len());

        for text in texts {
            let text = text.as_ref();
            let key = NormalizedKey::of(text);
            let slot = match slots.get(&key) {
                Some(slot) => *slot,
                None => {
                    let slot = unique.len();
                    slots.insert(key.clone(), slot);
                    unique.push(UniqueText {
                        text: text.to_string(),
                        key,
                    });
                    slot
                }
            };
            positions.push(slot);
        }

        Self { unique, positions }
    }

    /// Texts to send to the embedding computation, in first-seen order
    pub fn unique_texts(&self) -> Vec<String> {
        self.unique.iter().map(|u| u.text.clone()).collect()
    }

    pub fn unique(&self) -> &[UniqueText] {
        &self.unique
    }

    /// Slot backing the input at `index`
    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// Original positions that share `slot`
    pub fn indices_of(&self, slot: usize) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(index, s)| (*s == slot).then_some(index))
            .collect()
    }

    pub fn original_len(&self) -> usize {
        self.positions.len()
    }

    pub fn unique_len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Fan unique vectors back out to one vector per original input.
    ///
    /// `vectors[slot]` must be the embedding of `unique()[slot]`.
    pub fn reassemble(&self, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
        if vectors.len() != self.unique.len() {
            return Err(Error::Validation(format!(
                "expected {} unique embeddings, got {}",
                self.unique.len(),
                vectors.len()
            )));
        }

        let by_key: HashMap<&NormalizedKey, &Vec<f32>> = self
            .unique
            .iter()
            .map(|u| &u.key)
            .zip(vectors.iter())
            .collect();

        self.positions
            .iter()
            .map(|slot| {
                let key = &self.unique[*slot].key;
                by_key
                    .get(key)
                    .map(|v| (*v).clone())
                    .ok_or_else(|| Error::Validation(format!("no embedding for key {key:?}")))
            })
            .collect()
    }
}
