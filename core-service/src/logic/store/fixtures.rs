//! Test fixtures: in-memory loan tables

use rusqlite::{params, Connection};

use super::schema::LoanRecord;
use super::SqliteStore;

pub const TABLE: &str = "beneficiaries";

const SCHEMA_SQL: &str = r#"
CREATE TABLE beneficiaries (
    id INTEGER PRIMARY KEY,
    loan_amnt REAL NOT NULL,
    term INTEGER,
    int_rate REAL,
    installment REAL,
    grade TEXT,
    sub_grade TEXT,
    emp_length REAL,
    home_ownership TEXT,
    annual_inc REAL,
    verification_status TEXT,
    purpose TEXT,
    dti REAL,
    initial_fico_score INTEGER,
    is_defaulted INTEGER
);
"#;

/// Loan with sensible defaults; tweak fields with struct update syntax
pub fn loan(id: i64, grade: &str, loan_amnt: f64, fico: i64, defaulted: bool) -> LoanRecord {
    LoanRecord {
        id,
        loan_amnt,
        term: 36,
        int_rate: 10.0,
        installment: loan_amnt / 36.0,
        grade: grade.to_string(),
        sub_grade: format!("{}1", grade),
        emp_length: 5.0,
        home_ownership: "RENT".to_string(),
        annual_inc: 50_000.0,
        verification_status: "Verified".to_string(),
        purpose: "debt_consolidation".to_string(),
        dti: 15.0,
        initial_fico_score: fico,
        is_defaulted: i64::from(defaulted),
    }
}

pub fn empty_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory sqlite");
    conn.execute_batch(SCHEMA_SQL).expect("schema");
    conn
}

pub fn insert(conn: &Connection, records: &[LoanRecord]) {
    for r in records {
        conn.execute(
            "INSERT INTO beneficiaries (id, loan_amnt, term, int_rate, installment, grade, sub_grade, \
             emp_length, home_ownership, annual_inc, verification_status, purpose, dti, \
             initial_fico_score, is_defaulted) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                r.id,
                r.loan_amnt,
                r.term,
                r.int_rate,
                r.installment,
                r.grade,
                r.sub_grade,
                r.emp_length,
                r.home_ownership,
                r.annual_inc,
                r.verification_status,
                r.purpose,
                r.dti,
                r.initial_fico_score,
                r.is_defaulted,
            ],
        )
        .expect("insert loan");
    }
}

pub fn store_with(records: &[LoanRecord]) -> SqliteStore {
    let conn = empty_connection();
    insert(&conn, records);
    SqliteStore::from_connection(conn, TABLE).expect("valid table name")
}

/// Ten loans, three defaulted, spread over grades, purposes and FICO bands
pub fn sample_portfolio() -> Vec<LoanRecord> {
    vec![
        LoanRecord { purpose: "credit_card".into(), home_ownership: "MORTGAGE".into(), ..loan(1, "A", 10_000.0, 790, false) },
        LoanRecord { purpose: "credit_card".into(), home_ownership: "MORTGAGE".into(), ..loan(2, "A", 12_000.0, 810, false) },
        LoanRecord { home_ownership: "OWN".into(), ..loan(3, "B", 8_000.0, 720, false) },
        loan(4, "B", 6_000.0, 700, false),
        LoanRecord { term: 60, int_rate: 14.0, ..loan(5, "C", 15_000.0, 680, false) },
        LoanRecord { purpose: "home_improvement".into(), ..loan(6, "C", 20_000.0, 650, true) },
        LoanRecord { term: 60, int_rate: 18.0, purpose: "small_business".into(), ..loan(7, "D", 25_000.0, 600, true) },
        LoanRecord { purpose: "car".into(), ..loan(8, "E", 5_000.0, 560, true) },
        LoanRecord { purpose: "medical".into(), home_ownership: "OWN".into(), ..loan(9, "F", 3_000.0, 540, false) },
        LoanRecord { purpose: "vacation".into(), ..loan(10, "G", 1_000.0, 800, false) },
    ]
}
