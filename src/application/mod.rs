// Application layer - Use cases and the seams they depend on
pub mod chart_surface;
pub mod controller;
pub mod error;
pub mod forecast_api;
pub mod predict_all;
pub mod view_state;

#[cfg(test)]
pub mod test_support;

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
