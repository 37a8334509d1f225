//! Seeded, non-cryptographic number stream used to order questions per user.
//!
//! A 32-bit wrapping string hash seeds repeated `sin(x) * 10000` fractional
//! extraction. The hash is bit-exact across implementations. The draws are
//! not: `sin` implementations may differ in the last ulp and the scaling
//! amplifies any difference, so the stream depends on the platform's `sin`.
//! Orderings are reproducible within one build, not guaranteed to match other
//! runtimes (a JavaScript engine orders "alice" differently from here).

pub struct SeededSequence {
    state: f64,
}

impl SeededSequence {
    pub fn new(seed: &str) -> Self {
        Self {
            state: f64::from(seed_hash(seed)),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_fraction(&mut self) -> f64 {
        self.state = self.state.sin() * 10000.0;
        self.state - self.state.floor()
    }
}

/// `hash * 31 + unit` over the UTF-16 code units of `seed`, wrapping as i32.
pub fn seed_hash(seed: &str) -> i32 {
    seed.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

/// Backward Fisher-Yates over a copy of `items`, one draw per swap position.
pub fn shuffle<T: Clone>(items: &[T], random: &mut SeededSequence) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = (random.next_fraction() * (i + 1) as f64).floor() as usize;
        // a fraction that rounds up to 1.0 would otherwise index past i
        shuffled.swap(i, j.min(i));
    }
    shuffled
}
