use std::time::{Duration, Instant};

use rocket::tokio::sync::RwLock;

use crate::model::db::Question;

/// A short-lived cache of the question listing.
///
/// Each invalidation bumps a generation number, and a listing read from the database is only
/// cached if no invalidation happened while it was being read.
pub struct QuestionCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    generation: u64,
    entry: Option<(Instant, Vec<Question>)>,
}

/// The outcome of a cache lookup.
#[derive(Debug)]
pub enum Lookup {
    /// A fresh listing.
    Hit(Vec<Question>),
    /// Nothing usable; fill with a listing read at this generation.
    Miss(u64),
}

impl QuestionCache {
    /// A cache whose entries expire after `ttl`. A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub async fn lookup(&self) -> Lookup {
        let state = self.state.read().await;
        match &state.entry {
            Some((stored, questions)) if stored.elapsed() < self.ttl => {
                Lookup::Hit(questions.clone())
            }
            _ => Lookup::Miss(state.generation),
        }
    }

    /// Cache a listing, unless it was read before the latest invalidation.
    pub async fn fill(&self, generation: u64, questions: &[Question]) {
        if self.ttl.is_zero() {
            return;
        }
        let mut state = self.state.write().await;
        if state.generation == generation {
            state.entry = Some((Instant::now(), questions.to_vec()));
        }
    }

    /// Drop the cached listing.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generation(lookup: Lookup) -> u64 {
        match lookup {
            Lookup::Miss(generation) => generation,
            Lookup::Hit(_) => panic!("unexpected cache hit"),
        }
    }

    #[rocket::async_test]
    async fn hit_after_fill() {
        let cache = QuestionCache::new(Duration::from_secs(60));
        let gen = generation(cache.lookup().await);
        cache.fill(gen, &Question::examples()).await;
        match cache.lookup().await {
            Lookup::Hit(questions) => assert_eq!(Question::examples(), questions),
            Lookup::Miss(_) => panic!("expected a cache hit"),
        }
    }

    #[rocket::async_test]
    async fn invalidation_discards_entry_and_stale_fills() {
        let cache = QuestionCache::new(Duration::from_secs(60));
        let gen = generation(cache.lookup().await);
        cache.fill(gen, &Question::examples()).await;
        cache.invalidate().await;
        let newer = generation(cache.lookup().await);
        assert!(newer > gen);

        // A listing read before the invalidation must not be cached.
        cache.fill(gen, &Question::examples()).await;
        assert_eq!(newer, generation(cache.lookup().await));
    }

    #[rocket::async_test]
    async fn zero_ttl_never_caches() {
        let cache = QuestionCache::new(Duration::ZERO);
        let gen = generation(cache.lookup().await);
        cache.fill(gen, &Question::examples()).await;
        generation(cache.lookup().await);
    }
}
