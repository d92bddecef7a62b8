//! Bounded, expiring solution cache.

use crate::model::{Assignment, CspProblem, Payload};
use crate::search::Strategy;
use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Structural key of a problem solved with a strategy.
///
/// Hashes variable ids in order, the value ids of every domain, and each
/// constraint's name, priority and scope. Two problems of the same shape
/// but different content get different keys. Constraint logic itself is
/// opaque, so two constraints with equal names and scopes but different
/// behaviour are indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemFingerprint(u64);

impl ProblemFingerprint {
    pub fn of<P: Payload>(problem: &CspProblem<P>, strategy: Strategy) -> Self {
        let mut h = DefaultHasher::new();
        strategy.hash(&mut h);
        problem.variable_count().hash(&mut h);
        for (var, domain) in problem.variables().iter().zip(problem.domains()) {
            var.id().hash(&mut h);
            domain.len().hash(&mut h);
            for value in domain {
                value.id().hash(&mut h);
            }
        }
        problem.constraint_count().hash(&mut h);
        for constraint in problem.constraints() {
            constraint.name().hash(&mut h);
            constraint.priority().level().hash(&mut h);
            constraint.scope().len().hash(&mut h);
            for var in constraint.scope() {
                var.id().hash(&mut h);
            }
        }
        Self(h.finish())
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

struct CacheEntry<P: Payload> {
    assignment: Assignment<P>,
    inserted: Instant,
}

/// Hit and miss counters of a [`SolutionCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

/// Least-recently-used cache of solved assignments with a fixed
/// time-to-live.
///
/// Safe to share between threads; every operation takes one short lock.
/// An expired entry is dropped on lookup and reported as a miss.
pub struct SolutionCache<P: Payload> {
    entries: Mutex<LruCache<ProblemFingerprint, CacheEntry<P>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: Payload> SolutionCache<P> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<ProblemFingerprint, CacheEntry<P>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached assignment for `key`, if present and not expired.
    pub fn get(&self, key: ProblemFingerprint) -> Option<Assignment<P>> {
        let mut entries = self.lock();
        let lookup = entries
            .get(&key)
            .map(|entry| (entry.inserted.elapsed() < self.ttl).then(|| entry.assignment.clone()));
        let found = match lookup {
            Some(Some(assignment)) => Some(assignment),
            Some(None) => {
                entries.pop(&key);
                None
            }
            None => None,
        };
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Stores `assignment`, evicting the least recently used entry when
    /// full.
    pub fn insert(&self, key: ProblemFingerprint, assignment: Assignment<P>) {
        self.lock().put(
            key,
            CacheEntry {
                assignment,
                inserted: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::AllDifferent;
    use crate::model::{Value, Variable};
    use std::sync::Arc;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn solution(id: &str) -> Assignment {
        [(Variable::named("x"), Value::named(id))].into_iter().collect()
    }

    fn key(n: u64) -> ProblemFingerprint {
        ProblemFingerprint(n)
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = SolutionCache::new(capacity(4), Duration::from_secs(60));
        assert!(cache.get(key(1)).is_none());
        cache.insert(key(1), solution("A"));
        assert_eq!(cache.get(key(1)), Some(solution("A")));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, len: 1 });
    }

    #[test]
    fn test_least_recently_used_evicted() {
        let cache = SolutionCache::new(capacity(2), Duration::from_secs(60));
        cache.insert(key(1), solution("A"));
        cache.insert(key(2), solution("B"));
        assert!(cache.get(key(1)).is_some());
        cache.insert(key(3), solution("C"));

        assert!(cache.get(key(2)).is_none());
        assert!(cache.get(key(1)).is_some());
        assert!(cache.get(key(3)).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_expired_entry_dropped() {
        let cache = SolutionCache::new(capacity(2), Duration::ZERO);
        cache.insert(key(1), solution("A"));
        assert!(cache.get(key(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(SolutionCache::new(capacity(8), Duration::from_secs(60)));
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cache.insert(key(t * 100 + i % 4), solution("A"));
                        let _ = cache.get(key(t * 100));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 8);
    }

    fn two_var(name: &str, values: [&str; 2]) -> CspProblem {
        let (x, y) = (Variable::named("x"), Variable::named("y"));
        CspProblem::builder()
            .variable(x.clone(), values.map(Value::named))
            .variable(y.clone(), values.map(Value::named))
            .constraint(AllDifferent::new(name, vec![x, y]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_fingerprint_is_structural() {
        let a = two_var("xy", ["A", "B"]);
        let same = two_var("xy", ["A", "B"]);
        let other_values = two_var("xy", ["A", "C"]);
        let other_name = two_var("other", ["A", "B"]);

        let fp = |p: &CspProblem| ProblemFingerprint::of(p, Strategy::ForwardChecking);
        assert_eq!(fp(&a), fp(&same));
        assert_ne!(fp(&a), fp(&other_values));
        assert_ne!(fp(&a), fp(&other_name));
        assert_ne!(fp(&a), ProblemFingerprint::of(&a, Strategy::MinConflicts));
    }
}
