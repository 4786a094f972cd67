#![allow(dead_code)]

use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};
use tempfile::TempDir;

/// Thursday. Week = 2024-03-11..=2024-03-17.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

const SCHEMA: &str = "
CREATE TABLE company (
    id INTEGER PRIMARY KEY NOT NULL,
    cnumber TEXT,
    cname TEXT,
    address_line_1 TEXT,
    address_line_2 TEXT,
    address_locality TEXT,
    address_region TEXT,
    address_country TEXT,
    address_postal_code TEXT,
    siccodes TEXT,
    capital_amount REAL,
    capital_currency TEXT,
    incorporated DATE
);
CREATE TABLE directors (
    id INTEGER PRIMARY KEY NOT NULL,
    cnumber TEXT,
    name TEXT,
    appointed_on DATE
);
";

const ROWS: &str = "
INSERT INTO company VALUES
 (1, 'SC000001', 'Acme Widgets Ltd', '1 High Street', NULL, 'Edinburgh', 'Lothian', 'Scotland', 'EH1 1AA', '62012', 1000.0, 'GBP', '2024-03-14'),
 (2, 'SC000002', 'ACME Holdings PLC', '1 High Street', 'Floor 2', 'Edinburgh', 'Lothian', 'Scotland', 'EH1 1AA', '62012', 250.5, 'GBP', '2024-03-11'),
 (3, '00000003', 'Bolt & Nut Co', '22 Mill Lane', NULL, 'Leeds', 'Yorkshire', 'England', 'LS1 4AB', '25620', 1000.0, 'USD', '2024-03-01'),
 (4, '00000004', 'Cobalt Ventures', '22 Mill Lane', NULL, 'Leeds', 'Yorkshire', 'England', 'LS1 4AB', '64209', NULL, NULL, '2024-01-20'),
 (5, '00000005', 'Delta Dynamics', '9 Quay Road', NULL, 'Cardiff', 'Glamorgan', 'Wales', 'CF10 1AA', '62012', 5000.0, 'EUR', '2019-06-30'),
 (6, '00000006', 'Echo Labs', NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL);
INSERT INTO directors VALUES
 (1, 'SC000001', 'Jane Smith', '2024-03-14'),
 (2, 'SC000002', 'Jane Smith', '2024-03-11'),
 (3, '00000003', 'John Doe', '2024-03-01'),
 (4, '00000004', 'Jane Smith', '2024-01-20'),
 (5, '00000005', 'John Doe', '2019-06-30'),
 (6, '00000005', 'Alan Turing', '2020-01-01'),
 (7, '00000006', 'Ada Lovelace', NULL);
";

pub struct Fixture {
    // keeps the directory alive for the test's duration
    _dir: TempDir,
    pub path: String,
}

impl Fixture {
    pub fn seeded() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.db").to_string_lossy().to_string();
        let fixture = Fixture { _dir: dir, path };
        fixture.exec(SCHEMA);
        fixture.exec(ROWS);
        fixture
    }

    /// Run SQL through a writable connection of its own.
    pub fn exec(&self, sql: &str) {
        let mut conn = SqliteConnection::establish(&self.path).unwrap();
        conn.batch_execute(sql).unwrap();
    }
}
