//! Mutex-guarded in-memory backend for [`StudentStore`].

use super::StudentStore;
use super::types::{NewStudent, StoreError, Student, StudentId};
use async_trait::async_trait;
use tokio::sync::Mutex;

const FIRST_ID: StudentId = 1;

struct StoreState {
    students: Vec<Student>,
    next_id: StudentId,
}

impl StoreState {
    fn position(&self, id: StudentId) -> Result<usize, StoreError> {
        self.students
            .iter()
            .position(|student| student.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

/// Ordered record list plus identifier counter behind a single lock.
///
/// Reads and writes take the same exclusive lock. Identifiers start at 1 and are never reused,
/// even after the record holding one is deleted. Lookups are linear scans.
pub struct InMemoryStudentStore {
    state: Mutex<StoreState>,
}

impl InMemoryStudentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                students: Vec::new(),
                next_id: FIRST_ID,
            }),
        }
    }
}

impl Default for InMemoryStudentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn create(&self, student: NewStudent) -> Student {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;
        let student = Student::from_new(id, student);
        state.students.push(student.clone());
        student
    }

    async fn list(&self) -> Vec<Student> {
        self.state.lock().await.students.clone()
    }

    async fn get(&self, id: StudentId) -> Result<Student, StoreError> {
        let state = self.state.lock().await;
        let index = state.position(id)?;
        Ok(state.students[index].clone())
    }

    async fn update(&self, id: StudentId, student: NewStudent) -> Result<Student, StoreError> {
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        let stored = &mut state.students[index];
        stored.overwrite(student);
        Ok(stored.clone())
    }

    async fn delete(&self, id: StudentId) -> Result<Student, StoreError> {
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        Ok(state.students.remove(index))
    }

    async fn len(&self) -> usize {
        self.state.lock().await.students.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn input(name: &str, age: i64) -> NewStudent {
        NewStudent::new(name, age, format!("{}@x.com", name.to_lowercase())).expect("valid input")
    }

    #[tokio::test]
    async fn assigns_increasing_ids_from_one() {
        let store = InMemoryStudentStore::new();
        let ada = store.create(input("Ada", 30)).await;
        let bo = store.create(input("Bo", 25)).await;
        assert_eq!(ada.id, 1);
        assert_eq!(bo.id, 2);
        assert_eq!(store.get(1).await.expect("Ada stored"), ada);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryStudentStore::new();
        store.create(input("Ada", 30)).await;
        let bo = store.create(input("Bo", 25)).await;
        store.delete(bo.id).await.expect("delete Bo");

        let cy = store.create(input("Cy", 40)).await;
        assert_eq!(cy.id, 3);
    }

    #[tokio::test]
    async fn delete_preserves_order_of_remaining_records() {
        let store = InMemoryStudentStore::new();
        for name in ["Ada", "Bo", "Cy", "Di"] {
            store.create(input(name, 20)).await;
        }
        let removed = store.delete(2).await.expect("delete Bo");
        assert_eq!(removed.name, "Bo");

        let names: Vec<_> = store.list().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Ada", "Cy", "Di"]);
        assert_eq!(store.get(2).await, Err(StoreError::NotFound(2)));
        assert_eq!(store.delete(2).await, Err(StoreError::NotFound(2)));
        assert_eq!(
            store.update(2, input("Bo", 26)).await,
            Err(StoreError::NotFound(2))
        );
        assert_eq!(store.get(3).await.expect("Cy kept").id, 3);
    }

    #[tokio::test]
    async fn update_overwrites_fields_in_place() {
        let store = InMemoryStudentStore::new();
        store.create(input("Ada", 30)).await;
        store.create(input("Bo", 25)).await;

        let updated = store
            .update(1, NewStudent::new("Ada L.", 31, "ada@lovelace.dev").unwrap())
            .await
            .expect("update Ada");
        assert_eq!(updated.id, 1);

        let listed = store.list().await;
        assert_eq!(listed[0], updated);
        assert_eq!(listed[0].email, "ada@lovelace.dev");
        assert_eq!(listed[1].name, "Bo");
    }

    #[tokio::test]
    async fn list_reflects_creates_minus_deletes() {
        let store = InMemoryStudentStore::new();
        assert!(store.list().await.is_empty());
        assert!(store.is_empty().await);

        for i in 1..=6 {
            store.create(input("Student", i)).await;
        }
        for id in [2, 5] {
            store.delete(id).await.expect("delete");
        }
        assert_eq!(store.len().await, 4);
        let ids: Vec<_> = store.list().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, [1, 3, 4, 6]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_receive_unique_contiguous_ids() {
        let store = Arc::new(InMemoryStudentStore::new());
        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create(input("Student", i + 1)).await.id })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in tasks {
            assert!(ids.insert(task.await.expect("task joined")));
        }
        assert_eq!(ids, (1..=100).collect::<HashSet<_>>());
        assert_eq!(store.len().await, 100);
    }
}
