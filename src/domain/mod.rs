pub mod fake_rows;
pub mod record;
pub mod table;
