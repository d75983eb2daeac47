use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::fasta::FastaRecord;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

pub const SIMPLE_FASTA_STR: &str = ">chrT simple test
ACGTTGCAACGTNNNNGGCA
acgtacgtTTGACCAGTACG
GATTACAGGA
";

lazy_static! {
    pub static ref SIMPLE_FASTA: FastaRecord = FastaRecord::new(
        "chrT simple test",
        20,
        b"ACGTTGCAACGTNNNNGGCAacgtacgtTTGACCAGTACGGATTACAGGA".to_vec(),
    );
}

/// Uniformly random `ACGT` sequence.
#[must_use]
pub fn random_sequence(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    (0..len).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

/// Copies `sequence`, mutating each base with probability `rate`. Mutations
/// are substitutions (80%), single base insertions (10%) and deletions (10%).
#[must_use]
pub fn mutate(sequence: &[u8], rate: f64, seed: u64) -> Vec<u8> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut result = Vec::with_capacity(sequence.len() + sequence.len() / 10);

    for &base in sequence {
        if !rng.gen_bool(rate) {
            result.push(base);
            continue;
        }

        match rng.gen_range(0..10) {
            0 => {
                result.push(base);
                result.push(BASES[rng.gen_range(0..4)]);
            }
            1 => {}
            _ => {
                let substitute = BASES
                    .iter()
                    .copied()
                    .filter(|&b| b != base)
                    .nth(rng.gen_range(0..3))
                    .unwrap_or(base);
                result.push(substitute);
            }
        }
    }

    result
}
