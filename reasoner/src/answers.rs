//! I define the types returned by the query methods of [`Reasoner`](crate::Reasoner).
use std::fmt;
use std::iter::Peekable;

use chaser_api::backend::BackendAnswers;
use chaser_api::query::QueryResult;

use crate::correctness::Correctness;
use crate::error::ReasonerError;

/// An iterator over the answers to a query,
/// together with their [`Correctness`].
///
/// The correctness is computed when the query is issued;
/// later changes to the knowledge base do not affect it.
///
/// The iterator holds resources of the backend,
/// which are released when it is [closed](QueryAnswers::close) or dropped.
pub struct QueryAnswers<'r> {
    inner: Peekable<BackendAnswers<'r>>,
    correctness: Correctness,
    query: String,
}

impl<'r> QueryAnswers<'r> {
    pub(crate) fn new(inner: BackendAnswers<'r>, correctness: Correctness, query: String) -> Self {
        QueryAnswers {
            inner: inner.peekable(),
            correctness,
            query,
        }
    }

    /// The correctness of these answers.
    pub fn correctness(&self) -> Correctness {
        self.correctness
    }

    /// Whether there is no more answer.
    ///
    /// NB: an error of the backend counts as an answer.
    pub fn is_exhausted(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    /// Release the resources held by this iterator.
    pub fn close(self) {}
}

impl Iterator for QueryAnswers<'_> {
    type Item = Result<QueryResult, ReasonerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|res| {
            res.map(QueryResult::new)
                .map_err(ReasonerError::Backend)
        })
    }
}

impl fmt::Debug for QueryAnswers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryAnswers")
            .field("query", &self.query)
            .field("correctness", &self.correctness)
            .finish_non_exhaustive()
    }
}

impl Drop for QueryAnswers<'_> {
    fn drop(&mut self) {
        log::trace!("closing answers to {}", self.query);
    }
}

/// The number of answers to a query, together with their [`Correctness`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct QueryAnswerCount {
    /// The number of answers
    pub count: u64,
    /// The correctness of the answers
    pub correctness: Correctness,
}
