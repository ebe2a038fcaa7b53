//! Shared data model for the Lume bar.
//!
//! The wire format mirrors the JSON document consumed by the bar: a list of
//! collections, each holding an ordered tree of items. Everything optional on
//! the wire is optional here; deserialization never fails on a missing field.

pub mod id;
pub mod model;
pub mod tree;

pub use id::stable_id;
pub use model::{Action, ActionMessage, BarData, Collection, Detail, Item, ItemContext, ItemKind};
pub use tree::{assign_ids, find_path, item_at};
