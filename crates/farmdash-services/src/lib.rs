//! Crop and to-do collections for FarmDash.

pub mod crop;
pub mod store;
pub mod todo;

pub use crop::{Crop, CropCreateRequest, CropUpdateRequest};
pub use store::{
    IdGenerator, InMemoryStore, Resource, ResourceStore, SequentialIds, StoreError, StoreResult,
    UuidGenerator,
};
pub use todo::{Todo, TodoCreateRequest, TodoUpdateRequest};
