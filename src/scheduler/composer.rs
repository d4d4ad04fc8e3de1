use std::collections::HashSet;

use serde::Serialize;

use super::normalize_word;
use super::queue::ReviewQueue;

#[derive(Debug, Clone)]
pub struct BatchRequest<'a> {
    pub size: usize,
    /// Strong, known and already-picked words; applies to queue and fresh words.
    pub exclude: &'a HashSet<String>,
    /// Words still cooling down after their last exposure; applies to fresh words only.
    pub cooling: &'a HashSet<String>,
    pub level: Option<&'a str>,
    pub current_batch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedBatch {
    pub words: Vec<String>,
    pub from_queue: usize,
    pub fresh: usize,
    pub stale_dropped: usize,
}

impl ComposedBatch {
    pub fn is_partial(&self, size: usize) -> bool {
        self.words.len() < size
    }
}

/// Builds one batch: ready review words first, then fresh words from `sample`
/// until `size` is reached. `sample(exclude, level, count)` must return
/// candidates outside `exclude`; anything it returns that is excluded or
/// already picked is skipped. Returns fewer than `size` words when the pool
/// runs dry.
///
/// Drains consumed items from `queue`; callers persist the queue before
/// handing the batch out.
pub fn compose_batch<F>(queue: &mut ReviewQueue, request: &BatchRequest<'_>, sample: F) -> ComposedBatch
where
    F: FnMut(&HashSet<String>, Option<&str>, usize) -> Vec<String>,
{
    compose_batch_checked(queue, request, |_| true, sample)
}

/// Same as [`compose_batch`], but ready queue words for which `available`
/// returns `false` (no longer in the vocabulary) are dropped as stale.
pub fn compose_batch_checked<A, F>(
    queue: &mut ReviewQueue,
    request: &BatchRequest<'_>,
    available: A,
    mut sample: F,
) -> ComposedBatch
where
    A: Fn(&str) -> bool,
    F: FnMut(&HashSet<String>, Option<&str>, usize) -> Vec<String>,
{
    let mut picked: HashSet<String> = HashSet::with_capacity(request.size);
    let mut words = Vec::with_capacity(request.size);
    let mut stale_dropped = 0;

    for word in queue.take_ready(request.current_batch, request.size) {
        if request.exclude.contains(&word) || !available(&word) {
            stale_dropped += 1;
            continue;
        }
        if picked.insert(word.clone()) {
            words.push(word);
        }
    }
    let from_queue = words.len();

    let need = request.size.saturating_sub(words.len());
    if need > 0 {
        let mut blocked: HashSet<String> = request
            .exclude
            .iter()
            .chain(request.cooling.iter())
            .cloned()
            .collect();
        blocked.extend(picked.iter().cloned());

        for candidate in sample(&blocked, request.level, need) {
            if words.len() >= request.size {
                break;
            }
            let word = normalize_word(&candidate);
            if word.is_empty() || blocked.contains(&word) {
                continue;
            }
            if picked.insert(word.clone()) {
                words.push(word);
            }
        }
    }

    let fresh = words.len() - from_queue;
    tracing::debug!(
        from_queue,
        fresh,
        stale_dropped,
        target = request.size,
        "batch composed"
    );

    ComposedBatch {
        words,
        from_queue,
        fresh,
        stale_dropped,
    }
}
