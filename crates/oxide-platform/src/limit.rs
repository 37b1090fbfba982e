//! LIMIT/OFFSET rewriting of finished SELECT statements.
//!
//! The query arrives as opaque SQL text. Every strategy acts on the
//! outermost SELECT only: the ORDER BY and FROM lookups skip anything
//! nested in parentheses or quotes.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::{PlatformError, Result};

/// MySQL's largest row count, used as the limit when only an offset is given.
pub const MYSQL_MAX_ROWS: &str = "18446744073709551615";

/// Upper bound of a `ROWS m TO n` range when no limit is given.
pub const ROWS_RANGE_MAX: u64 = i64::MAX as u64;

static SELECT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^\s*SELECT(\s+DISTINCT)?\s+").expect("valid regex"));

/// Validated pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitSpec {
    limit: Option<u64>,
    offset: Option<u64>,
}

impl LimitSpec {
    /// Builds a request from caller-supplied values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a negative limit or offset.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self> {
        let limit = limit
            .map(|l| {
                u64::try_from(l)
                    .map_err(|_| PlatformError::invalid(format!("limit must be >= 0, got {l}")))
            })
            .transpose()?;
        let offset = offset
            .map(|o| {
                u64::try_from(o)
                    .map_err(|_| PlatformError::invalid(format!("offset must be >= 0, got {o}")))
            })
            .transpose()?;
        Ok(Self { limit, offset })
    }

    /// Requested row count.
    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Rows to skip; 0 when no offset was given.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// True when there is nothing to rewrite.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.limit.is_none() && self.offset() == 0
    }
}

/// Rewrites a SELECT statement to return a window of its rows.
pub trait LimitRewriter: Send + Sync + fmt::Debug {
    /// Applies `spec` to `query`. `platform` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the strategy cannot express the
    /// request and `InvalidArgument` when the query is not a SELECT.
    fn rewrite(&self, platform: &str, query: &str, spec: LimitSpec) -> Result<String>;
}

/// How a native `LIMIT ... OFFSET ...` vendor expresses an offset with no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetOnly {
    /// `LIMIT <sentinel> OFFSET m`.
    MaxRows(&'static str),
    /// `OFFSET m` alone.
    OffsetClause,
}

/// The pagination strategy families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStrategy {
    /// Trailing `LIMIT n OFFSET m`.
    Native(OffsetOnly),
    /// `SELECT TOP n`, offsets rejected.
    TopOnly,
    /// `SELECT TOP n` with a ROW_NUMBER() CTE for offsets.
    TopRowNumber,
    /// Oracle style ROWNUM double wrap.
    Rownum,
    /// Trailing `ROWS m TO n`.
    RowsRange,
    /// `SELECT SKIP m LIMIT n`.
    SkipLimit,
    /// Trailing `OFFSET m ROWS FETCH NEXT n ROWS ONLY`.
    OffsetFetch,
}

impl LimitRewriter for LimitStrategy {
    fn rewrite(&self, platform: &str, query: &str, spec: LimitSpec) -> Result<String> {
        if spec.is_noop() {
            return Ok(query.to_string());
        }
        let rewritten = match self {
            Self::Native(offset_only) => native(query, spec, *offset_only),
            Self::TopOnly => top_only(platform, query, spec)?,
            Self::TopRowNumber => top_row_number(query, spec)?,
            Self::Rownum => rownum(query, spec),
            Self::RowsRange => rows_range(query, spec),
            Self::SkipLimit => skip_limit(query, spec)?,
            Self::OffsetFetch => offset_fetch(query, spec),
        };
        trace!(platform, strategy = ?self, sql = %rewritten, "rewrote limit query");
        Ok(rewritten)
    }
}

fn native(query: &str, spec: LimitSpec, offset_only: OffsetOnly) -> String {
    let mut sql = query.to_string();
    let offset = spec.offset();
    match (spec.limit(), offset_only) {
        (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, OffsetOnly::MaxRows(sentinel)) if offset > 0 => {
            sql.push_str(&format!(" LIMIT {sentinel}"));
        }
        (None, _) => {}
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    sql
}

fn top_only(platform: &str, query: &str, spec: LimitSpec) -> Result<String> {
    if spec.offset() > 0 {
        return Err(PlatformError::unsupported(platform, "LIMIT with an OFFSET"));
    }
    match spec.limit() {
        Some(limit) => insert_after_select(query, &format!("TOP {limit} ")),
        None => Ok(query.to_string()),
    }
}

fn top_row_number(query: &str, spec: LimitSpec) -> Result<String> {
    let offset = spec.offset();
    if offset == 0 {
        return match spec.limit() {
            Some(limit) => insert_after_select(query, &format!("TOP {limit} ")),
            None => Ok(query.to_string()),
        };
    }

    let (body, order_by) = match find_top_level(query, &["ORDER", "BY"]) {
        Some((start, end)) => (query[..start].trim_end(), Some(query[end..].trim())),
        None => (query.trim_end(), None),
    };
    let over = order_by.unwrap_or("(SELECT 0)");
    let row_number = format!(", ROW_NUMBER() OVER (ORDER BY {over}) AS doctrine_rownum");

    let with_row_number = match find_top_level(body, &["FROM"]) {
        Some((start, _)) => {
            let select_list = body[..start].trim_end();
            format!("{select_list}{row_number} {}", &body[start..])
        }
        None => format!("{body}{row_number}"),
    };

    let first = offset + 1;
    let inner;
    let filter;
    match spec.limit() {
        Some(limit) => {
            let last = offset + limit;
            inner = format!(
                "{} ORDER BY doctrine_rownum",
                insert_after_select(&with_row_number, &format!("TOP {last} "))?
            );
            filter = format!("doctrine_rownum BETWEEN {first} AND {last}");
        }
        None => {
            inner = with_row_number;
            filter = format!("doctrine_rownum >= {first}");
        }
    }

    Ok(format!(
        "WITH dctrn_cte AS ({inner}) SELECT * FROM dctrn_cte \
         WHERE {filter} ORDER BY doctrine_rownum ASC"
    ))
}

fn rownum(query: &str, spec: LimitSpec) -> String {
    let offset = spec.offset();
    let mut inner = query.to_string();
    if find_top_level(&inner, &["FROM"]).is_none() {
        inner.push_str(" FROM dual");
    }

    let columns = if offset > 0 {
        "a.*, ROWNUM AS doctrine_rownum"
    } else {
        "a.*"
    };
    let mut sql = format!("SELECT {columns} FROM ({inner}) a");
    if let Some(limit) = spec.limit() {
        sql.push_str(&format!(" WHERE ROWNUM <= {}", offset + limit));
    }
    if offset > 0 {
        sql = format!("SELECT * FROM ({sql}) WHERE doctrine_rownum >= {}", offset + 1);
    }
    sql
}

fn rows_range(query: &str, spec: LimitSpec) -> String {
    let offset = spec.offset();
    let last = spec.limit().map_or(ROWS_RANGE_MAX, |limit| offset + limit);
    format!("{query} ROWS {} TO {last}", offset + 1)
}

fn skip_limit(query: &str, spec: LimitSpec) -> Result<String> {
    let mut clause = String::new();
    let offset = spec.offset();
    if offset > 0 {
        clause.push_str(&format!("SKIP {offset} "));
    }
    if let Some(limit) = spec.limit() {
        clause.push_str(&format!("LIMIT {limit} "));
    }
    insert_after_select(query, &clause)
}

fn offset_fetch(query: &str, spec: LimitSpec) -> String {
    let mut sql = query.to_string();
    if find_top_level(query, &["ORDER", "BY"]).is_none() {
        if is_distinct(query) {
            sql.push_str(" ORDER BY 1");
        } else {
            sql.push_str(" ORDER BY (SELECT 0)");
        }
    }
    sql.push_str(&format!(" OFFSET {} ROWS", spec.offset()));
    if let Some(limit) = spec.limit() {
        sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
    }
    sql
}

fn is_distinct(query: &str) -> bool {
    SELECT_PREFIX
        .captures(query)
        .is_some_and(|c| c.get(1).is_some())
}

/// Inserts `clause` right after `SELECT` (and `DISTINCT` when present).
fn insert_after_select(query: &str, clause: &str) -> Result<String> {
    let prefix = SELECT_PREFIX.find(query).ok_or_else(|| {
        PlatformError::invalid("limit rewriting requires a query starting with SELECT")
    })?;
    let keyword_end = prefix.as_str().trim_end().len() + prefix.start();
    Ok(format!(
        "{} {}{}",
        &query[..keyword_end],
        clause,
        &query[prefix.end()..]
    ))
}

/// Finds the first occurrence of the keyword sequence at nesting depth 0,
/// outside quoted text. Returns the byte range it covers.
pub(crate) fn find_top_level(sql: &str, words: &[&str]) -> Option<(usize, usize)> {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i, bytes[i]);
                continue;
            }
            b'[' => {
                i = skip_quoted(bytes, i, b']');
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && is_word_start(bytes, i) => {
                if let Some(end) = match_words(bytes, i, words) {
                    return Some((i, end));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_quoted(bytes: &[u8], start: usize, close: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == close {
            if bytes.get(i + 1) == Some(&close) && close != b']' {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.'
}

fn is_word_start(bytes: &[u8], i: usize) -> bool {
    i == 0 || !is_ident_byte(bytes[i - 1])
}

fn match_words(bytes: &[u8], start: usize, words: &[&str]) -> Option<usize> {
    let mut i = start;
    for (n, word) in words.iter().enumerate() {
        if n > 0 {
            let ws_start = i;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i == ws_start {
                return None;
            }
        }
        let end = i + word.len();
        if end > bytes.len() || !bytes[i..end].eq_ignore_ascii_case(word.as_bytes()) {
            return None;
        }
        i = end;
    }
    if i < bytes.len() && is_ident_byte(bytes[i]) {
        return None;
    }
    Some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(limit: Option<i64>, offset: Option<i64>) -> LimitSpec {
        LimitSpec::new(limit, offset).unwrap()
    }

    fn rewrite(
        strategy: LimitStrategy,
        query: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> String {
        strategy.rewrite("test", query, spec(limit, offset)).unwrap()
    }

    const MYSQL: LimitStrategy = LimitStrategy::Native(OffsetOnly::MaxRows(MYSQL_MAX_ROWS));

    #[test]
    fn test_negative_values_rejected() {
        assert!(LimitSpec::new(Some(-1), None).is_err());
        assert!(LimitSpec::new(None, Some(-5)).is_err());
    }

    #[test]
    fn test_noop() {
        for strategy in [
            MYSQL,
            LimitStrategy::TopOnly,
            LimitStrategy::TopRowNumber,
            LimitStrategy::Rownum,
            LimitStrategy::RowsRange,
            LimitStrategy::SkipLimit,
            LimitStrategy::OffsetFetch,
        ] {
            assert_eq!(rewrite(strategy, "SELECT * FROM t", None, None), "SELECT * FROM t");
        }
    }

    #[test]
    fn test_native() {
        assert_eq!(
            rewrite(MYSQL, "SELECT * FROM t", Some(10), Some(0)),
            "SELECT * FROM t LIMIT 10"
        );
        assert_eq!(
            rewrite(MYSQL, "SELECT * FROM t", None, Some(20)),
            "SELECT * FROM t LIMIT 18446744073709551615 OFFSET 20"
        );
        assert_eq!(
            rewrite(
                LimitStrategy::Native(OffsetOnly::OffsetClause),
                "SELECT * FROM t",
                None,
                Some(20)
            ),
            "SELECT * FROM t OFFSET 20"
        );
        assert_eq!(
            rewrite(MYSQL, "SELECT * FROM t", Some(5), Some(10)),
            "SELECT * FROM t LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_top_only() {
        assert_eq!(
            rewrite(LimitStrategy::TopOnly, "SELECT DISTINCT a FROM t", Some(3), None),
            "SELECT DISTINCT TOP 3 a FROM t"
        );
        let err = LimitStrategy::TopOnly
            .rewrite("sybase", "SELECT * FROM t", spec(Some(3), Some(1)))
            .unwrap_err();
        assert!(matches!(err, PlatformError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_top_row_number() {
        assert_eq!(
            rewrite(LimitStrategy::TopRowNumber, "SELECT * FROM t ORDER BY id", Some(5), Some(10)),
            "WITH dctrn_cte AS (SELECT TOP 15 *, ROW_NUMBER() OVER (ORDER BY id) \
             AS doctrine_rownum FROM t ORDER BY doctrine_rownum) SELECT * FROM dctrn_cte \
             WHERE doctrine_rownum BETWEEN 11 AND 15 ORDER BY doctrine_rownum ASC"
        );
        assert_eq!(
            rewrite(LimitStrategy::TopRowNumber, "SELECT a FROM t", None, Some(3)),
            "WITH dctrn_cte AS (SELECT a, ROW_NUMBER() OVER (ORDER BY (SELECT 0)) \
             AS doctrine_rownum FROM t) SELECT * FROM dctrn_cte \
             WHERE doctrine_rownum >= 4 ORDER BY doctrine_rownum ASC"
        );
        assert_eq!(
            rewrite(LimitStrategy::TopRowNumber, "SELECT * FROM t", Some(7), None),
            "SELECT TOP 7 * FROM t"
        );
    }

    #[test]
    fn test_top_row_number_ignores_nested_order_by() {
        let sql = rewrite(
            LimitStrategy::TopRowNumber,
            "SELECT a, (SELECT TOP 1 b FROM u ORDER BY b) AS x FROM t",
            Some(1),
            Some(1),
        );
        assert!(sql.contains("OVER (ORDER BY (SELECT 0))"));
        assert!(sql.contains("(SELECT TOP 1 b FROM u ORDER BY b) AS x, ROW_NUMBER()"));
    }

    #[test]
    fn test_rownum() {
        assert_eq!(
            rewrite(LimitStrategy::Rownum, "SELECT * FROM t", Some(10), Some(20)),
            "SELECT * FROM (SELECT a.*, ROWNUM AS doctrine_rownum FROM (SELECT * FROM t) a \
             WHERE ROWNUM <= 30) WHERE doctrine_rownum >= 21"
        );
        assert_eq!(
            rewrite(LimitStrategy::Rownum, "SELECT 1", Some(1), None),
            "SELECT a.* FROM (SELECT 1 FROM dual) a WHERE ROWNUM <= 1"
        );
    }

    #[test]
    fn test_rows_range() {
        assert_eq!(
            rewrite(LimitStrategy::RowsRange, "SELECT * FROM t", Some(10), Some(5)),
            "SELECT * FROM t ROWS 6 TO 15"
        );
        assert_eq!(
            rewrite(LimitStrategy::RowsRange, "SELECT * FROM t", None, Some(5)),
            "SELECT * FROM t ROWS 6 TO 9223372036854775807"
        );
    }

    #[test]
    fn test_skip_limit() {
        assert_eq!(
            rewrite(LimitStrategy::SkipLimit, "SELECT DISTINCT a FROM t", Some(10), Some(5)),
            "SELECT DISTINCT SKIP 5 LIMIT 10 a FROM t"
        );
        assert_eq!(
            rewrite(LimitStrategy::SkipLimit, "select a from t", Some(2), None),
            "select LIMIT 2 a from t"
        );
    }

    #[test]
    fn test_offset_fetch() {
        assert_eq!(
            rewrite(LimitStrategy::OffsetFetch, "SELECT * FROM t", Some(10), Some(5)),
            "SELECT * FROM t ORDER BY (SELECT 0) OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(
            rewrite(LimitStrategy::OffsetFetch, "SELECT DISTINCT a FROM t", Some(10), None),
            "SELECT DISTINCT a FROM t ORDER BY 1 OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(
            rewrite(LimitStrategy::OffsetFetch, "SELECT * FROM t ORDER BY id", None, Some(5)),
            "SELECT * FROM t ORDER BY id OFFSET 5 ROWS"
        );
    }

    #[test]
    fn test_find_top_level_skips_quotes_and_parens() {
        let sql = "SELECT 'ORDER BY' AS x, (SELECT y FROM u ORDER BY y) FROM t ORDER  BY z";
        let (start, end) = find_top_level(sql, &["ORDER", "BY"]).unwrap();
        assert_eq!(&sql[end..], " z");
        assert_eq!(&sql[start..start + 5], "ORDER");
        assert!(find_top_level("SELECT recorder_by FROM t", &["ORDER", "BY"]).is_none());
    }
}
