//! Residue-pair view scanning for protein structure comparison.
//!
//! Every sampled ordered pair of residues in a protein is described by a `View`: the backbone
//! angles of both residues, the chain direction between them, where the second residue sits in
//! the first residue's frame and how it is oriented. Views are discretised by a `Keyer` into
//! small integer keys so that two structures can be compared by hashing rather than by an
//! all-against-all geometric search.
//!
//! The haystack side (`StructureIndex`) inserts each view under every key its tolerance region
//! touches; the needle side (`QuerySet`) inserts each view under its exact key only. A scan then
//! walks the query keys in order, does one exact probe per key into the index, runs the
//! fine-grained `MatchCriteria` check on every candidate and hands each accepted match to a
//! caller-supplied action.
//!
//! With strides above 1 only every few residues are sampled, and each sampled pair stands for
//! the pairs around it. When two sampled pairs match, those surrounding pairs are compared
//! too, so the scan still reports matches between unsampled pairs.
//!
//! Both sides are tied to the `Policy` they were built with, and a scan refuses to run across
//! two different policy instances.
//!
pub mod error;
pub mod geometry;
pub mod view;
pub mod structure;
pub mod layout;
pub mod keyer_part;
pub mod keyer;
pub mod cross;
pub mod criteria;
pub mod stride;
pub mod policy;
pub mod store;
pub mod hash_store;
pub mod vector_store;
pub mod lattice_store;
pub mod store_builder;
pub mod structure_data;
pub mod diagnostics;
pub mod structure_index;
pub mod query_set;

pub use error::{Error, Result};
pub use policy::{Policy, PolicyConfig, StandardPolicy};
pub use query_set::QuerySet;
pub use structure_index::StructureIndex;
