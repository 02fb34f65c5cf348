//! Folder/document hierarchy: sibling name uniqueness, the derived
//! `has_children` flag, and cascade cleanup on delete.

pub mod db;
pub mod models;
