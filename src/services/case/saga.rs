//! All-or-nothing execution of a case mutation.
//!
//! Row writes go through one database transaction. Every uploaded object is
//! recorded as a compensation, so a failed mutation rolls the rows back and
//! removes the objects it already stored.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::error::{AppError, Result};
use crate::services::storage::{ObjectStorage, StoredObject, UploadFile};

pub struct Saga<'a> {
    txn: DatabaseTransaction,
    storage: &'a dyn ObjectStorage,
    uploaded: Vec<String>,
    operation: &'static str,
}

impl<'a> Saga<'a> {
    pub async fn begin(
        db: &DatabaseConnection,
        storage: &'a dyn ObjectStorage,
        operation: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            txn: db.begin().await?,
            storage,
            uploaded: Vec::new(),
            operation,
        })
    }

    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Upload a file and register its removal as the compensating action
    pub async fn upload(&mut self, file: &UploadFile) -> Result<StoredObject> {
        let stored = self.storage.upload(file).await?;
        self.uploaded.push(stored.url.clone());
        Ok(stored)
    }

    /// Commit on success; otherwise roll back, compensate and wrap the cause
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let Saga {
            txn,
            storage,
            uploaded,
            operation,
        } = self;

        let cause = match outcome {
            Ok(value) => match txn.commit().await {
                Ok(()) => return Ok(value),
                Err(e) => AppError::from(e),
            },
            Err(cause) => {
                if let Err(e) = txn.rollback().await {
                    tracing::error!(operation, error = %e, "Rollback failed");
                }
                cause
            }
        };

        tracing::warn!(
            operation,
            compensations = uploaded.len(),
            error = %cause,
            "Case mutation rolled back"
        );

        for url in uploaded.iter().rev() {
            if let Err(e) = storage.delete(url).await {
                tracing::error!(operation, url = %url, error = %e, "Failed to remove uploaded object");
            }
        }

        Err(AppError::aborted(cause))
    }
}
