//! Record types and error definitions for student storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned to a record by the store.
pub type StudentId = i64;

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Identifier assigned at creation; never changes afterwards.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Contact email address.
    pub email: String,
}

impl Student {
    pub(crate) fn from_new(id: StudentId, student: NewStudent) -> Self {
        let NewStudent { name, age, email } = student;
        Self {
            id,
            name,
            age,
            email,
        }
    }

    pub(crate) fn overwrite(&mut self, student: NewStudent) {
        let NewStudent { name, age, email } = student;
        self.name = name;
        self.age = age;
        self.email = email;
    }
}

/// Validated field values for a record that has not been assigned an identifier.
///
/// The only way to obtain one is [`NewStudent::new`], so the store never sees invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    name: String,
    age: i64,
    email: String,
}

/// Field-level validation failures for student input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `name` was empty.
    #[error("name must not be empty")]
    EmptyName,
    /// `age` was zero or negative.
    #[error("age must be greater than zero")]
    NonPositiveAge,
    /// `email` was empty.
    #[error("email must not be empty")]
    EmptyEmail,
}

impl NewStudent {
    /// Validate raw field values. No format checks are applied to `email`.
    pub fn new(
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let email = email.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if age <= 0 {
            return Err(ValidationError::NonPositiveAge);
        }
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        Ok(Self { name, age, email })
    }

    /// Validated name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validated age.
    pub fn age(&self) -> i64 {
        self.age
    }

    /// Validated email.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Errors returned by [`crate::store::StudentStore`] lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record carries the requested identifier.
    #[error("Student {0} not found")]
    NotFound(StudentId),
}
