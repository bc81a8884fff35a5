pub mod persisted_record;
pub mod record_store;
