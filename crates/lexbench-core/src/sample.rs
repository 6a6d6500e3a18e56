use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::{DataError, LexError, Result};
use crate::task::{Example, TaskConfig};

/// Select `n` few-shot examples from the task's training pool.
///
/// Selection is without replacement and fully determined by `seed`, so a run
/// can be reproduced. The returned order is the selection order and is
/// rendered into the prompt as-is.
pub fn sample_shots(
    task: &TaskConfig,
    pool: &[Example],
    n: usize,
    seed: u64,
) -> Result<Vec<Example>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if pool.len() < n {
        return Err(LexError::Data(DataError::InsufficientExamples {
            task: task.name.clone(),
            requested: n,
            available: pool.len(),
        }));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let picked = index::sample(&mut rng, pool.len(), n);
    Ok(picked.iter().map(|i| pool[i].clone()).collect())
}
