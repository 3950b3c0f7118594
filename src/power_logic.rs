/// Decide whether the radio should be powered up now.
///
/// Without a synced clock the radio is always due, since time sync needs
/// the network.
pub fn radio_start_due(now: Option<u64>, next_start: u64) -> bool {
    match now {
        Some(now) => now >= next_start,
        None => true,
    }
}

/// Decide whether an active radio session has done its job and the radio
/// can be switched off.
pub fn radio_may_sleep(
    all_topics_fresh: bool,
    clock_synced: bool,
    publish_pending: bool,
) -> bool {
    all_topics_fresh && clock_synced && !publish_pending
}
