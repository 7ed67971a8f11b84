#[cfg(test)]
mod corruption;
#[cfg(test)]
mod round_trip;

#[cfg(test)]
fn random_data(seed: u64, len: usize, alphabet: u16) -> std::vec::Vec<u8> {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.gen_range(0..alphabet) as u8)
        .collect()
}

/// Bytes with a long tailed distribution, so codes of very different lengths show up.
#[cfg(test)]
fn skewed_data(seed: u64, len: usize) -> std::vec::Vec<u8> {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let mut symbol = 0u8;
            while symbol < 255 && rng.gen_bool(0.5) {
                symbol += 1;
            }
            symbol
        })
        .collect()
}
