pub mod batch;

pub use batch::{PriceStatistics, SellerCounts};
