//! SQLite persistence for raw observations and their aggregates.
//!
//! The mastery core never touches this module; routes persist each
//! accepted observation here and the stats route reads the aggregates
//! back. The whole module is optional at runtime: without a configured
//! database the service keeps mastery state in memory only.

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

const SCHEMA_SQL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS observations (
      id TEXT PRIMARY KEY,
      learner_id TEXT NOT NULL,
      skill_id TEXT NOT NULL,
      correct INTEGER NOT NULL CHECK (correct IN (0,1)),
      timestamp TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_observations_learner_skill \
     ON observations(learner_id, skill_id)",
    "CREATE INDEX IF NOT EXISTS idx_observations_timestamp ON observations(timestamp)",
];

pub async fn connect(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_SQL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ObservationRow {
    pub learner_id: String,
    pub skill_id: String,
    pub correct: bool,
    pub timestamp: String,
}

pub async fn insert_observation(
    pool: &SqlitePool,
    row: &ObservationRow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO observations (id, learner_id, skill_id, correct, timestamp)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&row.learner_id)
    .bind(&row.skill_id)
    .bind(i64::from(row.correct))
    .bind(&row.timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStats {
    pub skill_id: String,
    pub observations: i64,
    pub correct: i64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub learner_id: String,
    pub observations: i64,
    pub correct: i64,
    pub accuracy: f64,
    pub skills: Vec<SkillStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
}

pub async fn learner_stats(
    pool: &SqlitePool,
    learner_id: &str,
) -> Result<LearnerStats, sqlx::Error> {
    let totals = sqlx::query(
        r#"
        SELECT COUNT(*) AS n,
               COALESCE(SUM(correct), 0) AS correct,
               MAX(timestamp) AS last_ts
        FROM observations
        WHERE learner_id = $1
        "#,
    )
    .bind(learner_id)
    .fetch_one(pool)
    .await?;

    let observations = totals.try_get::<i64, _>("n").unwrap_or(0);
    let correct = totals.try_get::<i64, _>("correct").unwrap_or(0);
    let last_timestamp = totals.try_get::<Option<String>, _>("last_ts").unwrap_or(None);

    let skill_rows = sqlx::query(
        r#"
        SELECT skill_id,
               COUNT(*) AS n,
               COALESCE(SUM(correct), 0) AS correct
        FROM observations
        WHERE learner_id = $1
        GROUP BY skill_id
        ORDER BY skill_id ASC
        "#,
    )
    .bind(learner_id)
    .fetch_all(pool)
    .await?;

    let skills = skill_rows
        .into_iter()
        .map(|row| {
            let n = row.try_get::<i64, _>("n").unwrap_or(0);
            let correct = row.try_get::<i64, _>("correct").unwrap_or(0);
            SkillStats {
                skill_id: row.try_get::<String, _>("skill_id").unwrap_or_default(),
                observations: n,
                correct,
                accuracy: ratio(correct, n),
            }
        })
        .collect();

    Ok(LearnerStats {
        learner_id: learner_id.to_string(),
        observations,
        correct,
        accuracy: ratio(correct, observations),
        skills,
        last_timestamp,
    })
}

fn ratio(correct: i64, total: i64) -> f64 {
    if total <= 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}
