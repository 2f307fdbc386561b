//! Simulated corporate ledger for the finance reference deployment.
//!
//! All data is hardcoded and fictional. The database stands in for a real
//! ERP extract: a quarter of expense transactions, two of which exceed the
//! CAPEX approval threshold, plus a `vendors` table that is deliberately
//! kept off the extraction allow-list so scenarios can demonstrate the
//! table guard.

use rusqlite::Connection;

use acta_contracts::error::{ActaError, ActaResult};
use acta_tools::SqlExtractor;

/// Tables the extraction tool may read. `vendors` exists in the database
/// but is not listed here.
pub const LEDGER_TABLES: &[&str] = &["transactions"];

/// Rows seeded into `transactions`.
pub const SEEDED_TRANSACTION_COUNT: usize = 14;

const SEED_SQL: &str = "
CREATE TABLE transactions (
    id        INTEGER PRIMARY KEY,
    timestamp TEXT NOT NULL,
    vendor    TEXT NOT NULL,
    category  TEXT NOT NULL,
    amount    REAL NOT NULL
);

CREATE TABLE vendors (
    id        INTEGER PRIMARY KEY,
    name      TEXT NOT NULL,
    onboarded TEXT NOT NULL
);

INSERT INTO transactions (id, timestamp, vendor, category, amount) VALUES
    (1,  '2025-04-02T09:14:00Z', 'Initech Supplies',      'OPEX',     120.50),
    (2,  '2025-04-06T14:30:00Z', 'Pied Piper Internet',   'SOFTWARE', 499.00),
    (3,  '2025-04-11T11:05:00Z', 'Globex Catering',       'MEALS',    312.75),
    (4,  '2025-04-15T16:47:00Z', 'Acme Office Interiors', 'CAPEX',    8450.00),
    (5,  '2025-04-21T08:20:00Z', 'Sterling Cooper Media', 'OPEX',     990.00),
    (6,  '2025-05-01T10:02:00Z', 'Duff Beverage Co',      'MEALS',    86.40),
    (7,  '2025-05-07T13:55:00Z', 'Initech Supplies',      'OPEX',     245.10),
    (8,  '2025-05-12T09:41:00Z', 'Vandelay Industries',   'TRAVEL',   1432.20),
    (9,  '2025-05-19T17:28:00Z', 'Hooli Cloud Services',  'CAPEX',    12200.00),
    (10, '2025-05-26T12:12:00Z', 'Pied Piper Internet',   'SOFTWARE', 499.00),
    (11, '2025-06-03T15:33:00Z', 'Globex Catering',       'MEALS',    1840.00),
    (12, '2025-06-10T10:48:00Z', 'Vandelay Industries',   'TRAVEL',   18.90),
    (13, '2025-06-17T09:07:00Z', 'Sterling Cooper Media', 'OPEX',     2150.00),
    (14, '2025-06-24T14:19:00Z', 'Initech Supplies',      'OPEX',     67.25);

INSERT INTO vendors (id, name, onboarded) VALUES
    (1, 'Initech Supplies',      '2023-02-14'),
    (2, 'Vandelay Industries',   '2024-07-01'),
    (3, 'Hooli Cloud Services',  '2025-03-30');
";

/// An in-memory ledger seeded with one quarter of fictional transactions.
pub fn seeded_ledger() -> ActaResult<Connection> {
    let conn = Connection::open_in_memory().map_err(|e| ActaError::Config {
        reason: format!("cannot open in-memory ledger: {}", e),
    })?;
    conn.execute_batch(SEED_SQL).map_err(|e| ActaError::Config {
        reason: format!("cannot seed ledger: {}", e),
    })?;
    Ok(conn)
}

/// The extraction tool over a freshly seeded ledger.
pub fn ledger_extractor() -> ActaResult<SqlExtractor> {
    Ok(SqlExtractor::from_connection(seeded_ledger()?, LEDGER_TABLES))
}

// ── Tests ────────────────────────────────────────────────────────────────────
