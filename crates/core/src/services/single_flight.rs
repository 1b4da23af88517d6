use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

/// At most one in-progress operation per key.
///
/// `try_acquire` never waits: a second caller for a busy key gets `None`
/// and is expected to report "already running". The key is released when
/// the returned permit is dropped, including on early return or panic.
#[derive(Debug, Default)]
pub struct SingleFlight {
    in_flight: Mutex<HashSet<Uuid>>,
}

/// Proof of ownership of a key; releases it on drop.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    owner: &'a SingleFlight,
    key: Uuid,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, key: Uuid) -> Option<FlightPermit<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight.insert(key) {
            Some(FlightPermit { owner: self, key })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self, key: Uuid) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&key)
    }
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.owner
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
