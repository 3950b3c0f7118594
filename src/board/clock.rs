//! Wall clock: last SNTP result plus the monotonic time since it.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;

static SYNCED: Mutex<CriticalSectionRawMutex, Cell<Option<(u64, Instant)>>> =
    Mutex::new(Cell::new(None));

/// Record a fresh Unix time.
pub fn set(epoch: u64) {
    SYNCED.lock(|c| c.set(Some((epoch, Instant::now()))));
}

/// Current Unix seconds, `None` before the first sync.
pub fn now() -> Option<u64> {
    SYNCED
        .lock(|c| c.get())
        .map(|(epoch, at)| epoch.saturating_add(at.elapsed().as_secs()))
}
