//! Student record storage: record types, the store abstraction, and the in-memory backend.

mod memory;
pub mod types;

pub use memory::InMemoryStudentStore;
pub use types::{NewStudent, StoreError, Student, StudentId, ValidationError};

use async_trait::async_trait;

/// Abstraction over record storage used by the HTTP surface.
///
/// Implementations own their synchronization; every operation is atomic with respect to the
/// others.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Assign the next identifier to `student`, append it, and return the stored record.
    async fn create(&self, student: NewStudent) -> Student;

    /// Return every record in insertion order.
    async fn list(&self) -> Vec<Student>;

    /// Fetch a single record by identifier.
    async fn get(&self, id: StudentId) -> Result<Student, StoreError>;

    /// Replace every field except the identifier of an existing record.
    async fn update(&self, id: StudentId, student: NewStudent) -> Result<Student, StoreError>;

    /// Remove a record, preserving the order of the remaining ones.
    async fn delete(&self, id: StudentId) -> Result<Student, StoreError>;

    /// Number of records currently stored.
    async fn len(&self) -> usize;

    /// Whether the store holds no records.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
