//! Cluster controller boundary for clusterq
//!
//! The trait queries call to fetch resources, the request and paging types
//! they pass, the provider error taxonomy, and an in-memory implementation.

mod controller;
mod errors;
mod memory;
mod request;
mod sorter;

pub use controller::{select_page, ClusterController};
pub use errors::{ControllerError, ControllerResult};
pub use memory::{Fixture, InMemoryController, TypeFixture};
pub use request::{
    PageRequest, PageResponse, Request, SortField, SortOrder, SortRequest, StartingPoint,
    TemporalInfo,
};
pub use sorter::ResourceSorter;
