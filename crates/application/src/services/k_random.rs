/// Samples `k` distinct elements from `items` in uniformly-random order,
/// without replacement (spec C6). `k > items.len()` yields only
/// `items.len()` elements.
///
/// Two strategies, chosen by how close `k` is to `n`:
/// - partial Fisher–Yates when the pool is small relative to `k`
/// - reject-resample when `k` is much smaller than `n`, to avoid copying
///   a large pool just to draw a handful of elements
pub fn iterate<T: Clone>(items: &[T], k: usize) -> Vec<T> {
    let n = items.len();
    let k = k.min(n);
    if k == 0 {
        return Vec::new();
    }

    if use_reject_resample(n, k) {
        reject_resample(items, k)
    } else {
        partial_fisher_yates(items, k)
    }
}

/// `n > 21 + ceil(log4(3k))` for `k > 5`; below that threshold, always
/// use partial Fisher–Yates.
fn use_reject_resample(n: usize, k: usize) -> bool {
    if k <= 5 {
        return false;
    }
    let log4_3k = (3.0 * k as f64).log(4.0).ceil() as usize;
    n > 21 + log4_3k
}

fn partial_fisher_yates<T: Clone>(items: &[T], k: usize) -> Vec<T> {
    let n = items.len();
    let mut pool: Vec<T> = items.to_vec();
    let mut out = Vec::with_capacity(k);
    for i in 0..k {
        let remaining = n - i;
        let j = fastrand::usize(0..remaining);
        out.push(pool[j].clone());
        pool.swap(j, remaining - 1);
    }
    out
}

fn reject_resample<T: Clone>(items: &[T], k: usize) -> Vec<T> {
    let n = items.len();
    let mut seen = std::collections::HashSet::with_capacity(k);
    let mut out = Vec::with_capacity(k);
    while out.len() < k {
        let j = fastrand::usize(0..n);
        if seen.insert(j) {
            out.push(items[j].clone());
        }
    }
    out
}

/// Seeds the current thread's PRNG deterministically, for reproducible
/// test runs.
pub fn seed_thread_rng(seed: u64) {
    fastrand::seed(seed);
}
