//! Weighted sampling against recent history.

use chirp_core::ContentItem;
use chirp_error::SelectionError;
use chirp_memory::AntiRepeatMemory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Rejected draws tolerated before drawing from the eligible items directly.
///
/// Both paths sample the same conditional distribution; the cap only bounds
/// the work done per selection.
pub const MAX_REDRAWS: usize = 1_000;

/// A chosen item and its position in the sequence it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    /// Position in the content sequence.
    pub index: usize,
    /// The chosen item.
    pub item: &'a ContentItem,
}

/// Weight an item contributes to sampling; unusable weights count as zero.
fn effective_weight(item: &ContentItem) -> f64 {
    if item.has_valid_weight() {
        *item.weight()
    } else {
        0.0
    }
}

/// Walk the items accumulating weight and return the first whose running
/// total exceeds `seed`.
///
/// Item `i` owns `[before_i, before_i + weight_i)`, so a seed on a boundary
/// belongs to the item starting there.
fn locate<'a, I>(items: I, seed: f64) -> Option<usize>
where
    I: IntoIterator<Item = (usize, &'a ContentItem)>,
{
    let mut progress = 0.0;
    let mut last_positive = None;
    for (index, item) in items {
        let weight = effective_weight(item);
        if weight <= 0.0 {
            continue;
        }
        last_positive = Some(index);
        progress += weight;
        if progress > seed {
            return Some(index);
        }
    }
    // Rounding can leave seed == total; the last interval absorbs it.
    last_positive
}

fn draw<R: Rng + ?Sized>(items: &[ContentItem], total: f64, rng: &mut R) -> Option<usize> {
    let seed = rng.gen_range(0.0..1.0) * total;
    trace!(seed, total, "Drawing");
    locate(items.iter().enumerate(), seed)
}

/// Select an item, avoiding indices held in `memory` when that is possible.
///
/// # Errors
///
/// Returns [`SelectionError`] with `EmptyLibrary` when `items` is empty or
/// the total weight is not a positive finite number.
pub fn select<'a, R: Rng + ?Sized>(
    items: &'a [ContentItem],
    memory: &AntiRepeatMemory,
    rng: &mut R,
) -> Result<Selection<'a>, SelectionError> {
    let total: f64 = items.iter().map(effective_weight).sum();
    if items.is_empty() || !total.is_finite() || total <= 0.0 {
        return Err(SelectionError::empty_library());
    }

    let eligible = |index: usize| !memory.contains(index) && items[index].has_valid_weight();
    let enforce = memory.capacity() < items.len() && (0..items.len()).any(eligible);
    if !enforce {
        debug!(
            capacity = memory.capacity(),
            items = items.len(),
            "Repetition constraint unsatisfiable, selecting without it"
        );
    }

    for attempt in 0..MAX_REDRAWS {
        let Some(index) = draw(items, total, rng) else {
            return Err(SelectionError::empty_library());
        };
        if !enforce || !memory.contains(index) {
            debug!(index, attempt, "Selected item");
            return Ok(Selection {
                index,
                item: &items[index],
            });
        }
        trace!(index, "Rejecting recently used item");
    }

    // Same distribution as rejection: a weighted draw over eligible items only.
    let eligible_total: f64 = (0..items.len())
        .filter(|&i| eligible(i))
        .map(|i| effective_weight(&items[i]))
        .sum();
    let seed = rng.gen_range(0.0..1.0) * eligible_total;
    let index = locate(
        items.iter().enumerate().filter(|(i, _)| eligible(*i)),
        seed,
    )
    .ok_or_else(SelectionError::empty_library)?;
    debug!(index, "Selected item from eligible subset");
    Ok(Selection {
        index,
        item: &items[index],
    })
}

/// Owns the random source used for selection.
#[derive(Debug, Clone)]
pub struct ContentSelector<R = StdRng> {
    rng: R,
}

impl ContentSelector<StdRng> {
    /// Selector seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector, for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ContentSelector<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> ContentSelector<R> {
    /// Selector using the given random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// See [`select`].
    pub fn select<'a>(
        &mut self,
        items: &'a [ContentItem],
        memory: &AntiRepeatMemory,
    ) -> Result<Selection<'a>, SelectionError> {
        select(items, memory, &mut self.rng)
    }
}
