use crate::core::types::{FinancialReport, SecuritiesCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// Report-item queries the resolver can issue.
///
/// Every template binds `$1 = amount`, `$2 = securities code` (company
/// master form) and `$3 = fiscal year`, and selects a single `xbrl_name`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTemplate {
    NonConsolidatedDuration,
    UnbalancedDuration,
    CreditDuration,
    CreditInstant,
}

impl QueryTemplate {
    pub fn sql(&self) -> &'static str {
        match self {
            QueryTemplate::NonConsolidatedDuration => NON_CONSOLIDATED_DURATION_SQL,
            QueryTemplate::UnbalancedDuration => UNBALANCED_DURATION_SQL,
            QueryTemplate::CreditDuration => CREDIT_DURATION_SQL,
            QueryTemplate::CreditInstant => CREDIT_INSTANT_SQL,
        }
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTemplate::NonConsolidatedDuration => write!(f, "non-consolidated duration"),
            QueryTemplate::UnbalancedDuration => write!(f, "unbalanced duration"),
            QueryTemplate::CreditDuration => write!(f, "credit duration"),
            QueryTemplate::CreditInstant => write!(f, "credit instant"),
        }
    }
}

/// Values bound into a template for one account of one report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupParams {
    pub amount: Decimal,
    pub securities_code: String,
    pub fiscal_year: NaiveDate,
}

impl LookupParams {
    pub fn new(amount: Decimal, securities_code: SecuritiesCode, fiscal_year: NaiveDate) -> Self {
        Self {
            amount,
            securities_code: securities_code.company_master_code(),
            fiscal_year,
        }
    }

    pub fn for_report(report: &FinancialReport, amount: Decimal) -> Self {
        Self::new(amount, report.securities_code, report.fiscal_year)
    }
}

// Dividends per share are only disclosed for the filer itself.
const NON_CONSOLIDATED_DURATION_SQL: &str = r#"
SELECT
    A.xbrl_name
FROM
    report_items A
INNER JOIN contexts C
    ON A.report_id = C.report_id
    AND A.context_name = C.context_name
INNER JOIN report_covers RC
    ON A.report_id = RC.id
INNER JOIN company_master D
    ON RC.company_id = D.code
WHERE
    A.amounts = $1
    AND C.context_name = 'CurrentYearDuration_NonConsolidatedMember'
    AND D.securities_code = $2
    AND C.period_to = $3
GROUP BY
    A.xbrl_name
"#;

const UNBALANCED_DURATION_SQL: &str = r#"
SELECT
    A.xbrl_name
FROM
    report_items A
INNER JOIN account_elements B
    ON A.xbrl_name = B.xbrl_name
    AND B.balance = ''
INNER JOIN contexts C
    ON A.report_id = C.report_id
    AND A.context_name = C.context_name
INNER JOIN report_covers RC
    ON A.report_id = RC.id
INNER JOIN company_master D
    ON RC.company_id = D.code
WHERE
    A.amounts = $1
    AND C.context_name = 'CurrentYearDuration'
    AND D.securities_code = $2
    AND C.period_to = $3
    AND A.xbrl_name NOT LIKE '%Comprehensive%'
GROUP BY
    A.xbrl_name
"#;

// Filer-specific elements have no row in account_elements, hence the
// outer join and the IS NULL branch.
const CREDIT_DURATION_SQL: &str = r#"
SELECT
    A.xbrl_name
FROM
    report_items A
LEFT OUTER JOIN account_elements B
    ON A.xbrl_name = B.xbrl_name
INNER JOIN contexts C
    ON A.report_id = C.report_id
    AND A.context_name = C.context_name
INNER JOIN report_covers RC
    ON A.report_id = RC.id
INNER JOIN company_master D
    ON RC.company_id = D.code
WHERE
    A.amounts = $1
    AND C.context_name = 'CurrentYearDuration'
    AND D.securities_code = $2
    AND C.period_to = $3
    AND A.xbrl_name NOT LIKE '%Comprehensive%'
    AND (B.balance = 'credit' OR B.balance IS NULL)
GROUP BY
    A.xbrl_name
"#;

const CREDIT_INSTANT_SQL: &str = r#"
SELECT
    A.xbrl_name
FROM
    report_items A
LEFT OUTER JOIN account_elements B
    ON A.xbrl_name = B.xbrl_name
    AND B.balance = 'credit'
INNER JOIN contexts C
    ON A.report_id = C.report_id
    AND A.context_name = C.context_name
INNER JOIN report_covers RC
    ON A.report_id = RC.id
INNER JOIN company_master D
    ON RC.company_id = D.code
WHERE
    A.amounts = $1
    AND C.context_name = 'CurrentYearInstant'
    AND D.securities_code = $2
    AND C.instant_date = $3
    AND (B.balance = 'credit' OR B.balance IS NULL)
GROUP BY
    A.xbrl_name
"#;
