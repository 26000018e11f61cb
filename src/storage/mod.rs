// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Storage backends.
//!
//! The cache talks to storage through the [`OrderedStorage`] / [`SubStore`]
//! traits only: namespaced sub-stores with point get/put/delete and ordered
//! iteration. [`MemoryStorage`] is the in-memory reference implementation the
//! test suites run against; durable backends live with the host application.

pub mod memory;
pub mod traits;

pub use memory::MemoryStorage;
pub use traits::{IterateOptions, OrderedStorage, StorageError, SubStore};
