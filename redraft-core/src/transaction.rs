//! Transactions over a [`Document`].
//!
//! A transaction captures a [`TransactionSnapshot`] when it opens. The body
//! runs against the live document; leaving it normally commits, while a
//! rollback signal, an error or a panic restores the snapshot. Transactions
//! nest, and each level only reverts the work done inside it.
//!
//! ```rust
//! use redraft::{Document, Outcome, PageOptions};
//!
//! let mut doc = Document::new();
//! let outcome = doc.try_transaction(|tx| {
//!     tx.start_new_page(PageOptions::default())?;
//!     tx.text("keep this page")?;
//!     Ok(tx.page_count())
//! })?;
//!
//! assert_eq!(outcome.committed(), Some(2));
//! # Ok::<(), redraft::PdfError>(())
//! ```

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::snapshot::TransactionSnapshot;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// An entry on the document's stack of open transactions.
#[derive(Debug)]
pub(crate) struct OpenTransaction {
    pub(crate) token: u64,
    pub(crate) snapshot: TransactionSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committing,
    RollingBack,
    Closed,
}

/// Requests that a specific open transaction be rolled back.
///
/// Only [`Transaction::rollback`] and [`Document::rollback`] create one, so
/// a signal always names a transaction that was open when it was raised.
#[derive(Debug)]
pub struct RollbackSignal {
    token: u64,
}

impl RollbackSignal {
    pub fn token(&self) -> u64 {
        self.token
    }
}

/// Why a transaction body stopped early.
///
/// Errors returned by document operations convert into `Failed` through
/// `?`. A rollback signal travels as its own variant, so code that handles
/// [`PdfError`] never sees it.
#[derive(Debug)]
pub enum Interrupt {
    Rollback(RollbackSignal),
    Failed(PdfError),
}

impl From<PdfError> for Interrupt {
    fn from(err: PdfError) -> Self {
        Interrupt::Failed(err)
    }
}

impl From<std::io::Error> for Interrupt {
    fn from(err: std::io::Error) -> Self {
        Interrupt::Failed(PdfError::Io(err))
    }
}

/// Result type of a transaction body.
pub type TxResult<T = ()> = std::result::Result<T, Interrupt>;

/// How a transaction closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Committed(T),
    RolledBack,
}

impl<T> Outcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Outcome::RolledBack)
    }

    /// The body's value if the transaction committed.
    pub fn committed(self) -> Option<T> {
        match self {
            Outcome::Committed(value) => Some(value),
            Outcome::RolledBack => None,
        }
    }
}

/// An open transaction. Dereferences to the [`Document`] it guards.
///
/// Dropping a transaction that is still active rolls it back.
pub struct Transaction<'d> {
    doc: &'d mut Document,
    token: u64,
    depth: usize,
    state: TransactionState,
}

impl<'d> Transaction<'d> {
    fn begin(doc: &'d mut Document) -> Self {
        let token = doc.next_token;
        doc.next_token += 1;
        let snapshot = TransactionSnapshot::capture(doc);
        debug!(
            token,
            depth = doc.transactions.len() + 1,
            objects = snapshot.issued(),
            bytes = snapshot.byte_size(),
            "begin transaction"
        );
        doc.transactions.push(OpenTransaction { token, snapshot });
        let depth = doc.transactions.len();
        Self {
            doc,
            token,
            depth,
            state: TransactionState::Active,
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// Nesting level, 1 for the outermost transaction.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Builds the signal that rolls back this transaction. Return it from
    /// the body, directly or through `?`.
    pub fn rollback<T>(&self) -> TxResult<T> {
        Err(Interrupt::Rollback(RollbackSignal { token: self.token }))
    }

    /// Runs `body` and closes the transaction according to how it ended.
    ///
    /// Returns `true` on commit and `false` on rollback. Errors raised by the
    /// body are returned after the rollback completes.
    pub fn run_and_close<F>(self, body: F) -> Result<bool>
    where
        F: FnOnce(&mut Transaction<'_>) -> TxResult,
    {
        self.run(body).map(|outcome| outcome.is_committed())
    }

    /// Like [`Transaction::run_and_close`], keeping the body's value.
    pub fn run<T, F>(mut self, body: F) -> Result<Outcome<T>>
    where
        F: FnOnce(&mut Transaction<'_>) -> TxResult<T>,
    {
        match body(&mut self) {
            Ok(value) => {
                self.close_committed()?;
                Ok(Outcome::Committed(value))
            }
            Err(Interrupt::Rollback(signal)) if signal.token == self.token => {
                self.close_rolled_back()?;
                Ok(Outcome::RolledBack)
            }
            Err(Interrupt::Rollback(signal)) => {
                self.close_rolled_back()?;
                Err(PdfError::TransactionMisuse(format!(
                    "rollback signal for transaction {} reached transaction {}",
                    signal.token, self.token
                )))
            }
            Err(Interrupt::Failed(err)) => {
                debug!(token = self.token, error = %err, "transaction body failed");
                self.close_rolled_back()?;
                Err(err)
            }
        }
    }

    /// Keeps every change made since the transaction opened.
    pub fn commit(mut self) -> Result<()> {
        self.close_committed()
    }

    /// Reverts every change made since the transaction opened.
    pub fn abort(mut self) -> Result<()> {
        self.close_rolled_back()
    }

    fn close_committed(&mut self) -> Result<()> {
        self.state = TransactionState::Committing;
        self.pop_own()?;
        self.state = TransactionState::Closed;
        debug!(token = self.token, depth = self.depth, "commit transaction");
        Ok(())
    }

    fn close_rolled_back(&mut self) -> Result<()> {
        self.state = TransactionState::RollingBack;
        let open = self.pop_own()?;
        open.snapshot.restore(self.doc);
        self.state = TransactionState::Closed;
        debug!(token = self.token, depth = self.depth, "roll back transaction");
        Ok(())
    }

    fn pop_own(&mut self) -> Result<OpenTransaction> {
        match self.doc.transactions.last() {
            Some(top) if top.token == self.token => self
                .doc
                .transactions
                .pop()
                .ok_or_else(|| PdfError::TransactionMisuse("no open transaction".to_string())),
            Some(top) => Err(PdfError::TransactionMisuse(format!(
                "transaction {} closed while transaction {} is still open",
                self.token, top.token
            ))),
            None => Err(PdfError::TransactionMisuse(format!(
                "transaction {} is not open",
                self.token
            ))),
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.doc
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.doc
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.state == TransactionState::Closed {
            return;
        }
        warn!(
            token = self.token,
            state = ?self.state,
            "transaction dropped while open, rolling back"
        );
        if let Some(index) = self
            .doc
            .transactions
            .iter()
            .rposition(|open| open.token == self.token)
        {
            let open = self.doc.transactions.remove(index);
            self.doc.transactions.truncate(index);
            open.snapshot.restore(self.doc);
        }
        self.state = TransactionState::Closed;
    }
}

impl Document {
    /// Opens a transaction guard. Close it with [`Transaction::commit`] or
    /// [`Transaction::abort`]; dropping it rolls back.
    pub fn begin_transaction(&mut self) -> Transaction<'_> {
        Transaction::begin(self)
    }

    /// Runs `body` in a new transaction.
    ///
    /// Returns `Ok(true)` if it committed and `Ok(false)` if it rolled back.
    /// When the body fails, its changes are reverted and the error is
    /// returned.
    pub fn transaction<F>(&mut self, body: F) -> Result<bool>
    where
        F: FnOnce(&mut Transaction<'_>) -> TxResult,
    {
        self.begin_transaction().run_and_close(body)
    }

    /// Runs `body` in a new transaction and keeps its value on commit.
    pub fn try_transaction<T, F>(&mut self, body: F) -> Result<Outcome<T>>
    where
        F: FnOnce(&mut Transaction<'_>) -> TxResult<T>,
    {
        self.begin_transaction().run(body)
    }

    /// Runs `primary` in a transaction and, if it rolls back, runs
    /// `fallback` against the restored document.
    pub fn transaction_or_else<T, F, G>(&mut self, primary: F, fallback: G) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> TxResult<T>,
        G: FnOnce(&mut Document) -> Result<T>,
    {
        match self.try_transaction(primary)? {
            Outcome::Committed(value) => Ok(value),
            Outcome::RolledBack => fallback(self),
        }
    }

    /// Signal that rolls back the innermost open transaction.
    ///
    /// Outside of a transaction this fails with `TransactionMisuse`.
    pub fn rollback<T>(&self) -> TxResult<T> {
        match self.transactions.last() {
            Some(open) => Err(Interrupt::Rollback(RollbackSignal { token: open.token })),
            None => Err(Interrupt::Failed(PdfError::TransactionMisuse(
                "rollback requested outside of a transaction".to_string(),
            ))),
        }
    }

    pub fn in_transaction(&self) -> bool {
        !self.transactions.is_empty()
    }

    pub fn transaction_depth(&self) -> usize {
        self.transactions.len()
    }
}
