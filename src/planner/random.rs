use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_f64(&mut self) -> f64;
}

/// `StdRng`, seeded from the OS or from a fixed seed.
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Uniform index into a collection of `len` items.
pub fn pick_index(rng: &mut dyn RandomSource, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let r = rng.next_f64().clamp(0.0, 1.0);
    Some(((r * len as f64) as usize).min(len - 1))
}

/// True with probability `p`.
pub fn chance(rng: &mut dyn RandomSource, p: f64) -> bool {
    rng.next_f64() < p
}

/// Replays a fixed list of draws, cycling when exhausted.
#[cfg(test)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    pub fn constant(v: f64) -> Self {
        Self::new(vec![v])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_index_stays_in_bounds() {
        let mut rng = ScriptedRandom::new(vec![0.0, 0.5, 0.999_999, 1.0]);
        assert_eq!(pick_index(&mut rng, 4), Some(0));
        assert_eq!(pick_index(&mut rng, 4), Some(2));
        assert_eq!(pick_index(&mut rng, 4), Some(3));
        assert_eq!(pick_index(&mut rng, 4), Some(3));
        assert_eq!(pick_index(&mut rng, 0), None);
    }

    #[test]
    fn chance_compares_against_probability() {
        let mut rng = ScriptedRandom::new(vec![0.29, 0.3]);
        assert!(chance(&mut rng, 0.3));
        assert!(!chance(&mut rng, 0.3));
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let mut a = StdRandom::seeded(7);
        let mut b = StdRandom::seeded(7);
        for _ in 0..10 {
            let x = a.next_f64();
            assert!((0.0..1.0).contains(&x));
            assert_eq!(x, b.next_f64());
        }
    }
}
