pub mod accessories;
pub mod dedup;

pub use accessories::filter_accessories;
pub use dedup::dedup_by_id;
