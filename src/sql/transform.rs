//! Insert-select statements that build the star schema from staging
//!
//! Every statement is a single set-based insert evaluated by the warehouse.
//! Dimension keys are deduplicated with `ROW_NUMBER() ... = 1` so exactly one
//! row per key survives even when staged rows disagree on attributes.

use super::Dialect;
use crate::schema::{TableSchema, DIM_ARTIST, DIM_SONG, DIM_TIME, DIM_USER, FACT_SONGPLAYS};

/// One insert-select into a star-schema table
#[derive(Debug, Clone)]
pub struct TransformStep {
    pub table: &'static TableSchema,
    pub sql: String,
}

/// Best-effort match of a playback event to a catalog song.
///
/// Events carry no song or artist ids, so the join is an exact string match
/// on title and artist name. Case, punctuation and spelling differences miss,
/// and a title shared by two catalog rows for one artist matches both.
/// Events that match nothing are dropped. Redshift ignores trailing blanks
/// when comparing varchar values and SQLite does not, so `"Imagine "` matches
/// `"Imagine"` only on Redshift.
pub const BEST_EFFORT_MATCH: &str = "e.song = s.title AND e.artist = s.artist_name";

/// Page value marking an actual playback action
pub const PLAYBACK_PAGE: &str = "NextSong";

/// Calendar parts stored in the time dimension, in column order
pub const TIME_PARTS: &[&str] = &["hour", "day", "week", "month", "year", "weekday"];

fn insert_header(table: &TableSchema) -> String {
    let columns: Vec<&str> = table.insertable_columns().iter().map(|c| c.name).collect();
    format!("INSERT INTO {} ({})", table.name, columns.join(", "))
}

fn songplay_insert(dialect: Dialect) -> String {
    format!(
        "{header}
SELECT DISTINCT
    {start_time} AS start_time,
    e.userid AS user_id,
    e.level,
    s.song_id,
    s.artist_id,
    e.sessionid AS session_id,
    e.location,
    e.useragent AS user_agent
FROM staging_events e
JOIN staging_songs s ON {matching}
WHERE e.page = '{page}'
  AND e.userid IS NOT NULL
  AND s.song_id IS NOT NULL
  AND s.artist_id IS NOT NULL",
        header = insert_header(&FACT_SONGPLAYS),
        start_time = dialect.epoch_millis_to_timestamp("e.ts"),
        matching = BEST_EFFORT_MATCH,
        page = PLAYBACK_PAGE,
    )
}

/// The latest event per user wins. Every projected column breaks
/// remaining ties so the pick never depends on load order.
fn user_insert() -> String {
    format!(
        "{header}
SELECT user_id, first_name, last_name, gender, level
FROM (
    SELECT
        e.userid AS user_id,
        e.firstname AS first_name,
        e.lastname AS last_name,
        e.gender,
        e.level,
        ROW_NUMBER() OVER (
            PARTITION BY e.userid
            ORDER BY CAST(e.ts AS BIGINT) DESC NULLS LAST,
                     e.sessionid DESC NULLS LAST,
                     e.iteminsession DESC NULLS LAST,
                     e.level NULLS LAST,
                     e.firstname NULLS LAST,
                     e.lastname NULLS LAST,
                     e.gender NULLS LAST
        ) AS pick
    FROM staging_events e
    WHERE e.page = '{page}'
      AND e.userid IS NOT NULL
) ranked
WHERE pick = 1",
        header = insert_header(&DIM_USER),
        page = PLAYBACK_PAGE,
    )
}

/// The most recent catalog year per song wins
fn song_insert() -> String {
    format!(
        "{header}
SELECT song_id, title, artist_id, year, duration
FROM (
    SELECT
        s.song_id,
        s.title,
        s.artist_id,
        s.year,
        s.duration,
        ROW_NUMBER() OVER (
            PARTITION BY s.song_id
            ORDER BY s.year DESC NULLS LAST,
                     s.title NULLS LAST,
                     s.artist_id NULLS LAST,
                     s.duration NULLS LAST
        ) AS pick
    FROM staging_songs s
    WHERE s.song_id IS NOT NULL
) ranked
WHERE pick = 1",
        header = insert_header(&DIM_SONG),
    )
}

/// Rows with a known location and coordinates win
fn artist_insert() -> String {
    format!(
        "{header}
SELECT artist_id, name, location, latitude, longitude
FROM (
    SELECT
        s.artist_id,
        s.artist_name AS name,
        s.artist_location AS location,
        s.artist_latitude AS latitude,
        s.artist_longitude AS longitude,
        ROW_NUMBER() OVER (
            PARTITION BY s.artist_id
            ORDER BY CASE WHEN s.artist_location IS NULL OR s.artist_location = '' THEN 1 ELSE 0 END,
                     CASE WHEN s.artist_latitude IS NULL OR s.artist_longitude IS NULL THEN 1 ELSE 0 END,
                     s.artist_name NULLS LAST,
                     s.artist_location NULLS LAST,
                     s.artist_latitude NULLS LAST,
                     s.artist_longitude NULLS LAST
        ) AS pick
    FROM staging_songs s
    WHERE s.artist_id IS NOT NULL
) ranked
WHERE pick = 1",
        header = insert_header(&DIM_ARTIST),
    )
}

fn time_insert() -> String {
    let parts: Vec<String> = TIME_PARTS
        .iter()
        .map(|part| format!("    DATE_PART('{}', f.start_time) AS {}", part, part))
        .collect();

    format!(
        "{header}
SELECT DISTINCT
    f.start_time,
{parts}
FROM fact_songplays f",
        header = insert_header(&DIM_TIME),
        parts = parts.join(",\n"),
    )
}

/// The five inserts in execution order: fact, user, song, artist, time
pub fn transform_steps(dialect: Dialect) -> Vec<TransformStep> {
    vec![
        TransformStep {
            table: &FACT_SONGPLAYS,
            sql: songplay_insert(dialect),
        },
        TransformStep {
            table: &DIM_USER,
            sql: user_insert(),
        },
        TransformStep {
            table: &DIM_SONG,
            sql: song_insert(),
        },
        TransformStep {
            table: &DIM_ARTIST,
            sql: artist_insert(),
        },
        TransformStep {
            table: &DIM_TIME,
            sql: time_insert(),
        },
    ]
}
