use std::io::Read;

use csv::{ByteRecord, ReaderBuilder};
use serde::Serialize;

use common::{Error, Result, TradeRecord};

use crate::header::ColumnMap;
use crate::normalize::{RowNormalizer, SkipReason};

/// A data row that was read but not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row_number: i64,
    pub reason: SkipReason,
}

/// Outcome for one data row, in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(TradeRecord),
    Skipped(SkippedRow),
}

/// Streams normalized rows out of a CSV source.
///
/// The header row is consumed on construction. Data rows are numbered from 1
/// and every row, accepted or skipped, advances the counter.
pub struct CsvRows<R> {
    reader: csv::Reader<R>,
    normalizer: RowNormalizer,
    record: ByteRecord,
    next_row: i64,
    finished: bool,
}

impl<R: Read> CsvRows<R> {
    pub fn new(source: R, default_sector: Option<&str>) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers = reader
            .byte_headers()
            .map_err(|e| Error::Unreadable(e.to_string()))?;
        if headers.is_empty() || headers.iter().all(|h| h.iter().all(u8::is_ascii_whitespace)) {
            return Err(Error::EmptyInput);
        }
        let columns = ColumnMap::from_headers(headers.iter().map(|h| String::from_utf8_lossy(h)));

        Ok(Self {
            reader,
            normalizer: RowNormalizer::new(columns, default_sector),
            record: ByteRecord::new(),
            next_row: 1,
            finished: false,
        })
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = RowOutcome;

    fn next(&mut self) -> Option<RowOutcome> {
        if self.finished {
            return None;
        }
        let row_number = self.next_row;
        let outcome = match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => {
                self.finished = true;
                return None;
            }
            Ok(true) => {
                let fields: Vec<String> = self
                    .record
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).into_owned())
                    .collect();
                match self.normalizer.normalize(&fields, row_number) {
                    Ok(record) => RowOutcome::Accepted(record),
                    Err(reason) => RowOutcome::Skipped(SkippedRow { row_number, reason }),
                }
            }
            Err(e) => {
                // the reader cannot resume after an I/O failure
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    self.finished = true;
                }
                RowOutcome::Skipped(SkippedRow {
                    row_number,
                    reason: SkipReason::Unreadable(e.to_string()),
                })
            }
        };
        self.next_row += 1;
        Some(outcome)
    }
}
