//! Argument-keyed memoization for pure, fallible functions
//!
//! Results are cached under the JSON serialization of the arguments, so two
//! calls with equal arguments share one result for the life of the wrapper.
//! Only successful results are stored and nothing is ever invalidated.

use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

/// Memoizing wrapper around `func`
pub struct Memoized<A: ?Sized, R, E, F>
where
    F: Fn(&A) -> Result<R, E>,
{
    func: F,
    cache: Mutex<HashMap<String, Arc<R>>>,
    _args: PhantomData<fn(&A) -> Result<R, E>>,
}

impl<A, R, E, F> Memoized<A, R, E, F>
where
    A: Serialize + ?Sized,
    F: Fn(&A) -> Result<R, E>,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            cache: Mutex::new(HashMap::new()),
            _args: PhantomData,
        }
    }

    /// Returns the cached result for `args`, computing it on first use
    pub fn call(&self, args: &A) -> Result<Arc<R>, E> {
        let key = match serde_json::to_string(args) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("arguments not serializable, skipping cache: {}", e);
                return (self.func)(args).map(Arc::new);
            }
        };

        if let Some(hit) = self.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        let value = Arc::new((self.func)(args)?);
        self.lock().insert(key, Arc::clone(&value));
        Ok(value)
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<R>>> {
        // a panic inside `func` never happens while the lock is held
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
