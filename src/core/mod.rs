// Core modules implementing schema, record encoding, table storage, and error modeling.
pub mod error;
pub mod record;
pub mod scan;
pub mod schema;
pub mod table;
