use std::collections::HashSet;

use crate::types::RawListing;

/// Keep the first occurrence of each listing id, in first-seen order.
/// Listings without an id are never treated as duplicates of each other.
/// Returns the survivors and the number of duplicates dropped.
pub fn dedup_by_id(listings: Vec<RawListing>) -> (Vec<RawListing>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(listings.len());
    let mut unique = Vec::with_capacity(listings.len());
    let mut duplicates = 0usize;

    for listing in listings {
        if let Some(id) = listing.id() {
            if !seen.insert(id) {
                duplicates += 1;
                continue;
            }
        }
        unique.push(listing);
    }

    (unique, duplicates)
}
