use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::DashboardError;
use crate::models::EnrollmentRecord;
use crate::source::{RecordOrder, RecordSource};

const SELECT_RECORDS: &str = "SELECT last_name, first_name, strand, grade_level, semester, status \
                              FROM enrollment.applications";

// Insertion order; keeps roster indices stable across runs.
const WORKING_SET_ORDER: &str = "ORDER BY created_at, id";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let applicants = vec![
        ("seed-001", "Doe", "Jane", "STEM", 11, "1st", "Pending"),
        ("seed-002", "Cruz", "Ana", "ABM", 12, "2nd", "Enrolled"),
        ("seed-003", "Santos", "Miguel", "TVL-ICT", 11, "1st", "Enrolled"),
        ("seed-004", "Reyes", "Lia", "HUMSS", 12, "1st", "Rejected"),
        ("seed-005", "Mendoza", "Carlo", "STEM", 12, "2nd", "Enrolled"),
        ("seed-006", "Aquino", "Bea", "ABM", 11, "2nd", "Pending"),
    ];

    for (source_key, last_name, first_name, strand, grade_level, semester, status) in applicants {
        sqlx::query(
            r#"
            INSERT INTO enrollment.applications
            (id, last_name, first_name, strand, grade_level, semester, status, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(last_name)
        .bind(first_name)
        .bind(strand)
        .bind(grade_level)
        .bind(semester)
        .bind(status)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// One CSV row as imported. `source_key` is optional; rows without one get
/// a key derived from their contents so re-importing a file is a no-op.
#[derive(Debug, serde::Deserialize)]
struct ImportRow {
    last_name: String,
    first_name: String,
    #[serde(default)]
    track: String,
    level: i32,
    term: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    source_key: Option<String>,
}

impl ImportRow {
    fn key(&self) -> String {
        if let Some(key) = self.source_key.as_deref().filter(|key| !key.is_empty()) {
            return key.to_string();
        }
        let content = [
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.track.as_str(),
            &self.level.to_string(),
            self.term.as_str(),
            self.status.as_str(),
        ]
        .join("\u{1f}");
        format!("import-{}", Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes()))
    }
}

fn parse_import_rows(bytes: &[u8]) -> Result<Vec<ImportRow>, csv::Error> {
    csv::Reader::from_reader(bytes).deserialize().collect()
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let bytes = std::fs::read(csv_path)?;
    let rows = parse_import_rows(&bytes)?;
    let mut inserted = 0usize;

    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollment.applications
            (id, last_name, first_name, strand, grade_level, semester, status, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.last_name)
        .bind(&row.first_name)
        .bind(non_blank(&row.track))
        .bind(row.level)
        .bind(&row.term)
        .bind(non_blank(&row.status))
        .bind(row.key())
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

fn non_blank(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn record_from_row(row: &PgRow) -> Result<EnrollmentRecord, sqlx::Error> {
    Ok(EnrollmentRecord {
        last_name: row.try_get("last_name")?,
        first_name: row.try_get("first_name")?,
        track: row.try_get::<Option<String>, _>("strand")?.unwrap_or_default(),
        level: row.try_get("grade_level")?,
        term: row.try_get("semester")?,
        status: row.try_get::<Option<String>, _>("status")?.unwrap_or_default(),
    })
}

/// Postgres-backed record source.
#[derive(Clone)]
pub struct PgRecordSource {
    pool: PgPool,
}

impl PgRecordSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RecordSource for PgRecordSource {
    async fn fetch_all(&self) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        let query = format!("{SELECT_RECORDS} {WORKING_SET_ORDER}");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn fetch_ordered(
        &self,
        order: RecordOrder,
        limit: usize,
    ) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        let query = format!("{SELECT_RECORDS} ORDER BY {} LIMIT $1", order.sql());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(&query).bind(limit).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
