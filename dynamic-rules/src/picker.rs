//! Roulette-wheel selection over weighted entries.

use rand::Rng;

/// Outcome of a single weighted draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPick {
    /// Caller-supplied index of the chosen entry.
    pub index: usize,
    /// Point on the wheel the draw landed on, in `[0, total_weight)`.
    pub roll: f32,
    pub total_weight: f32,
}

fn usable(weight: f32) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Draw one entry from `(index, weight)` pairs with probability `weight / sum`.
///
/// Returns `None` when the slice is empty or no entry carries positive weight.
/// Zero-weight entries are never returned.
pub fn pick_weighted<R: Rng + ?Sized>(
    weights: &[(usize, f32)],
    rng: &mut R,
) -> Option<WeightedPick> {
    let total_weight: f32 = weights
        .iter()
        .map(|(_, weight)| *weight)
        .filter(|weight| usable(*weight))
        .sum();
    if total_weight <= 0.0 {
        return None;
    }

    let roll = rng.r#gen::<f32>() * total_weight;
    let mut accumulated = 0.0_f32;
    let mut last_usable = None;
    for (index, weight) in weights {
        if !usable(*weight) {
            continue;
        }
        accumulated += *weight;
        last_usable = Some(*index);
        if accumulated >= roll {
            return Some(WeightedPick {
                index: *index,
                roll,
                total_weight,
            });
        }
    }

    // Rounding can leave the running sum a hair short of the roll.
    last_usable.map(|index| WeightedPick {
        index,
        roll,
        total_weight,
    })
}

/// Draw one item from `(item, weight)` pairs.
pub fn pick<'a, T, R: Rng + ?Sized>(candidates: &'a [(T, f32)], rng: &mut R) -> Option<&'a T> {
    let weights: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, (_, weight))| (idx, *weight))
        .collect();
    pick_weighted(&weights, rng)
        .and_then(|chosen| candidates.get(chosen.index).map(|(item, _)| item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn empty_and_zero_weight_pools_yield_none() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        assert!(pick_weighted(&[], &mut rng).is_none());
        assert!(pick_weighted(&[(0, 0.0), (1, 0.0)], &mut rng).is_none());
        let empty: [(&str, f32); 0] = [];
        assert!(pick(&empty, &mut rng).is_none());
    }

    #[test]
    fn zero_weight_entries_are_never_chosen() {
        let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
        let weights = [(0, 0.0), (1, 2.0), (2, 0.0), (3, 1.0)];
        for _ in 0..2_000 {
            let chosen = pick_weighted(&weights, &mut rng).unwrap();
            assert!(chosen.index == 1 || chosen.index == 3);
            assert!(chosen.roll < chosen.total_weight);
        }
    }

    #[test]
    fn weighted_choice_prefers_higher_weight() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let candidates = [("rare", 1.0), ("common", 50.0)];
        let mut common = 0;
        for _ in 0..500 {
            if pick(&candidates, &mut rng) == Some(&"common") {
                common += 1;
            }
        }
        assert!(common > 450, "common picked {common} times");
    }

    #[test]
    fn frequencies_track_weights() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x00C0_FFEE);
        let weights = [(0, 1.0), (1, 3.0)];
        let draws = 20_000;
        let mut hits = [0_u32; 2];
        for _ in 0..draws {
            let chosen = pick_weighted(&weights, &mut rng).unwrap();
            hits[chosen.index] += 1;
        }
        let share = f64::from(hits[1]) / f64::from(draws);
        assert!((share - 0.75).abs() < 0.02, "share was {share}");
    }

    #[test]
    fn indices_are_passed_through() {
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
        let chosen = pick_weighted(&[(7, 4.0)], &mut rng).unwrap();
        assert_eq!(chosen.index, 7);
        assert!((chosen.total_weight - 4.0).abs() < f32::EPSILON);
    }
}
