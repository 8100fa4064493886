pub mod backup;
pub mod bulk;

pub use backup::{read_json_lines, write_backup, write_daily_raw, write_json_lines};
pub use bulk::{BulkIngester, IngestStats};
