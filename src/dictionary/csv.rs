use super::{ReportStream, ReverseDictionary};
use crate::core::error::LookupError;
use crate::core::types::{AccountingStandard, FinancialReport, Outcome, SecuritiesCode};
use ::csv::{ReaderBuilder, StringRecord, Trim};
use chrono::NaiveDate;
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::mpsc;

pub const SECURITIES_CODE_COLUMN: &str = "SecuritiesCode";
pub const ACCOUNTING_STANDARD_COLUMN: &str = "AccountingStandard";
pub const FISCAL_YEAR_COLUMN: &str = "FiscalYear";

/// Marks an account the filer does not disclose at all.
const NOT_AVAILABLE: &str = "NA";

/// Reports parsed ahead of the consumer.
const READ_AHEAD: usize = 64;

/// Reverse dictionary exported as CSV: one row per report, one column per
/// normalized account.
///
/// Rows are parsed on the blocking pool, so a successful `get` must run
/// inside a Tokio runtime.
pub struct CsvReverseDictionary {
    path: PathBuf,
    encoding: Option<String>,
}

impl CsvReverseDictionary {
    pub fn new(path: impl AsRef<Path>, encoding: Option<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            encoding,
        }
    }
}

impl ReverseDictionary for CsvReverseDictionary {
    fn get(&self) -> Outcome<ReportStream> {
        if !self.path.exists() {
            return Outcome::aborted(format!(
                "reverse dictionary {} does not exist",
                self.path.display()
            ));
        }
        if self.path.is_dir() {
            return Outcome::aborted(format!(
                "reverse dictionary {} is a directory",
                self.path.display()
            ));
        }

        let encoding = match self.encoding.as_deref() {
            Some(label) => match Encoding::for_label(label.as_bytes()) {
                Some(encoding) => Some(encoding),
                None => return Outcome::aborted(format!("unknown encoding label `{}`", label)),
            },
            None => None,
        };

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                return Outcome::aborted(format!(
                    "cannot open reverse dictionary {}: {}",
                    self.path.display(),
                    e
                ))
            }
        };

        let decoded = DecodeReaderBytesBuilder::new()
            .encoding(encoding)
            .build(file);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(decoded);

        let layout = match reader.headers() {
            Ok(headers) => match ColumnLayout::from_headers(headers) {
                Ok(layout) => layout,
                Err(reason) => return Outcome::Aborted(reason),
            },
            Err(e) => {
                return Outcome::aborted(format!(
                    "cannot read reverse dictionary header of {}: {}",
                    self.path.display(),
                    e
                ))
            }
        };
        log::debug!(
            "Reverse dictionary {} has {} account column(s)",
            self.path.display(),
            layout.accounts.len()
        );

        let (tx, rx) = mpsc::channel::<anyhow::Result<FinancialReport>>(READ_AHEAD);
        tokio::task::spawn_blocking(move || {
            for record in reader.into_records() {
                let report = match record {
                    Ok(record) => layout.parse(&record).map_err(anyhow::Error::from),
                    Err(e) => Err(e.into()),
                };
                let failed = report.is_err();
                // A closed channel means the consumer stopped early.
                if tx.blocking_send(report).is_err() || failed {
                    break;
                }
            }
        });

        let reports = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|report| (report, rx))
        });
        Outcome::Succeeded(reports.boxed())
    }
}

struct ColumnLayout {
    securities_code: usize,
    accounting_standard: usize,
    fiscal_year: usize,
    accounts: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, String> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| format!("reverse dictionary has no `{}` column", name))
        };

        let securities_code = position(SECURITIES_CODE_COLUMN)?;
        let accounting_standard = position(ACCOUNTING_STANDARD_COLUMN)?;
        let fiscal_year = position(FISCAL_YEAR_COLUMN)?;

        let accounts = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                !h.is_empty() && ![securities_code, accounting_standard, fiscal_year].contains(i)
            })
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Ok(Self {
            securities_code,
            accounting_standard,
            fiscal_year,
            accounts,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<FinancialReport, LookupError> {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let invalid = |reason: String| LookupError::InvalidDictionary { line, reason };
        let field = |index: usize| record.get(index).unwrap_or_default();

        let securities_code = SecuritiesCode::from_str(field(self.securities_code)).map_err(|e| {
            invalid(format!(
                "securities code `{}`: {}",
                field(self.securities_code),
                e
            ))
        })?;

        let accounting_standard =
            AccountingStandard::from_str(field(self.accounting_standard)).map_err(invalid)?;

        let fiscal_year = parse_date(field(self.fiscal_year))
            .ok_or_else(|| invalid(format!("fiscal year `{}`", field(self.fiscal_year))))?;

        let mut account_amounts = BTreeMap::new();
        for (index, account) in &self.accounts {
            let value = field(*index);
            if value.eq_ignore_ascii_case(NOT_AVAILABLE) {
                continue;
            }
            let amount = if value.is_empty() {
                None
            } else {
                Some(
                    parse_amount(value)
                        .ok_or_else(|| invalid(format!("{} amount `{}`", account, value)))?,
                )
            };
            account_amounts.insert(account.clone(), amount);
        }

        Ok(FinancialReport::new(
            securities_code,
            accounting_standard,
            fiscal_year,
            account_amounts,
        ))
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}

fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.replace(',', "");
    if value.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(&value).ok()
    } else {
        Decimal::from_str(&value).ok()
    }
}
