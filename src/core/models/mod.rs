pub mod audit_entry;
pub mod document;
pub mod payload;
pub mod public_key;
pub mod version_record;
