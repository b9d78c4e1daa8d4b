use chrono::Utc;

use std::sync::Arc;

use crate::date_key::DateKey;

pub trait Clock: Send + Sync {
    fn today(&self) -> DateKey;
}

pub type SharedClock = Arc<dyn Clock>;

/// Reads the current UTC calendar day.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DateKey {
        DateKey::new(Utc::now().date_naive())
    }
}

pub struct FixedClock(pub DateKey);

impl Clock for FixedClock {
    fn today(&self) -> DateKey {
        self.0
    }
}
