//! Single-pass cursor over paginated search results
//!
//! The cursor drives [`CompanyClient::search_page`] with increasing `skip`
//! offsets and yields raw records one at a time. The sequence ends at the
//! first short or empty page, or as soon as the max-records cap is reached;
//! a cap reached mid-page short-circuits any further page fetch.

use crate::client::CompanyClient;
use crate::error::{Error, Result};
use crate::types::SearchParams;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::debug;

/// Lazy, finite, non-restartable sequence of raw company records
///
/// Obtained from [`CompanyClient::search`]. Each record is yielded exactly
/// once, in API-reported order; there is no deduplication and no retry. Any
/// client error propagates immediately and fuses the cursor.
pub struct RecordCursor<'a> {
    client: &'a CompanyClient,
    params: SearchParams,
    max_records: Option<u64>,
    skip: u64,
    yielded: u64,
    buffer: VecDeque<Value>,
    last_page_seen: bool,
    finished: bool,
}

impl<'a> RecordCursor<'a> {
    pub(crate) fn new(
        client: &'a CompanyClient,
        params: SearchParams,
        max_records: Option<u64>,
    ) -> Result<Self> {
        if params.limit == 0 {
            return Err(Error::InvalidInput(
                "limit must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            client,
            params,
            max_records,
            skip: 0,
            yielded: 0,
            buffer: VecDeque::new(),
            last_page_seen: false,
            finished: false,
        })
    }

    /// Number of records yielded so far
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    /// Return the next record, or `None` once the sequence has ended.
    ///
    /// The cursor is fused: after the natural end of the sequence or an
    /// error, every further call returns `Ok(None)`.
    ///
    /// # Errors
    /// Propagates client errors and raises [`Error::UnexpectedResponse`]
    /// when a page's `data` field is present but not an array.
    pub async fn try_next(&mut self) -> Result<Option<Value>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if let Some(record) = self.buffer.pop_front() {
                self.yielded += 1;
                if self.max_records.is_some_and(|cap| self.yielded >= cap) {
                    self.finished = true;
                }
                return Ok(Some(record));
            }

            if self.last_page_seen {
                self.finished = true;
                return Ok(None);
            }

            if let Err(error) = self.fetch_page().await {
                self.finished = true;
                return Err(error);
            }
        }
    }

    /// Fetch the next page into the buffer and record pagination state.
    async fn fetch_page(&mut self) -> Result<()> {
        let page_size = self.params.page_size();
        let mut payload = self.client.search_page(&self.params, self.skip).await?;

        let records = match payload.get_mut("data") {
            // An absent data field means the result set is exhausted.
            None => {
                self.last_page_seen = true;
                return Ok(());
            }
            Some(value) => match value.take() {
                Value::Array(records) => records,
                _ => {
                    return Err(Error::UnexpectedResponse(
                        "'data' is not an array".to_string(),
                    ));
                }
            },
        };

        debug!(skip = self.skip, records = records.len(), "fetched search page");

        if (records.len() as u64) < u64::from(page_size) {
            self.last_page_seen = true;
        }
        self.skip += u64::from(page_size);
        self.buffer.extend(records);

        Ok(())
    }
}
