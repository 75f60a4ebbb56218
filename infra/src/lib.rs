pub mod documents;
pub mod persistence;
pub mod sources;
