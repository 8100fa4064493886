use tracing::debug;

use crate::taxonomy::Blocklist;
use crate::types::RawListing;

/// Drop listings whose title or description names gear or an accessory.
/// Returns the surviving listings and how many were removed.
pub fn filter_accessories(
    listings: Vec<RawListing>,
    blocklist: &Blocklist,
) -> (Vec<RawListing>, usize) {
    let before = listings.len();
    let kept: Vec<RawListing> = listings
        .into_iter()
        .filter(|listing| {
            let blocked = blocklist.matches(&listing.text());
            if blocked {
                debug!(id = ?listing.id(), title = %listing.title(), "[FILTER] accessory removed");
            }
            !blocked
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}
