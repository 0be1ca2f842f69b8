//! Table schema definitions for the staging area and the songplay star schema

use super::types::*;

// =============================================================================
// Staging Tables (raw copies of the source records, no constraints)
// =============================================================================

/// Column order matches the event JSONPaths descriptor
pub static STAGING_EVENTS: TableSchema = TableSchema {
    name: "staging_events",
    role: TableRole::Staging,
    columns: &[
        Column::new("artist", ColumnType::Varchar),
        Column::new("auth", ColumnType::Varchar),
        Column::new("firstname", ColumnType::Varchar),
        Column::new("gender", ColumnType::Char(1)),
        Column::new("iteminsession", ColumnType::Integer),
        Column::new("lastname", ColumnType::Varchar),
        Column::new("length", ColumnType::Real),
        Column::new("level", ColumnType::Varchar),
        Column::new("location", ColumnType::Text),
        Column::new("method", ColumnType::Varchar),
        Column::new("page", ColumnType::Varchar),
        Column::new("registration", ColumnType::Varchar),
        Column::new("sessionid", ColumnType::Integer),
        Column::new("song", ColumnType::Varchar),
        Column::new("status", ColumnType::Integer),
        Column::new("ts", ColumnType::Varchar),
        Column::new("useragent", ColumnType::Text),
        Column::new("userid", ColumnType::Integer),
    ],
    primary_key: None,
    sources: &[],
};

pub static STAGING_SONGS: TableSchema = TableSchema {
    name: "staging_songs",
    role: TableRole::Staging,
    columns: &[
        Column::new("artist_id", ColumnType::Varchar),
        Column::new("artist_latitude", ColumnType::Real),
        Column::new("artist_location", ColumnType::LongText),
        Column::new("artist_longitude", ColumnType::Real),
        Column::new("artist_name", ColumnType::LongText),
        Column::new("duration", ColumnType::Real),
        Column::new("num_songs", ColumnType::Integer),
        Column::new("song_id", ColumnType::Varchar),
        Column::new("title", ColumnType::LongText),
        Column::new("year", ColumnType::Integer),
    ],
    primary_key: None,
    sources: &[],
};

// =============================================================================
// Star Schema
// =============================================================================

pub static FACT_SONGPLAYS: TableSchema = TableSchema {
    name: "fact_songplays",
    role: TableRole::Fact,
    columns: &[
        Column::required("songplay_id", ColumnType::Identity),
        Column::required("start_time", ColumnType::Timestamp),
        Column::required("user_id", ColumnType::Integer),
        Column::new("level", ColumnType::Varchar),
        Column::new("song_id", ColumnType::Varchar),
        Column::new("artist_id", ColumnType::Varchar),
        Column::new("session_id", ColumnType::Integer),
        Column::new("location", ColumnType::Varchar),
        Column::new("user_agent", ColumnType::Varchar),
    ],
    primary_key: Some("songplay_id"),
    sources: &["staging_events", "staging_songs"],
};

pub static DIM_USER: TableSchema = TableSchema {
    name: "dim_user",
    role: TableRole::Dimension,
    columns: &[
        Column::required("user_id", ColumnType::Integer),
        Column::new("first_name", ColumnType::Varchar),
        Column::new("last_name", ColumnType::Varchar),
        Column::new("gender", ColumnType::Varchar),
        Column::new("level", ColumnType::Varchar),
    ],
    primary_key: Some("user_id"),
    sources: &["staging_events"],
};

pub static DIM_SONG: TableSchema = TableSchema {
    name: "dim_song",
    role: TableRole::Dimension,
    columns: &[
        Column::required("song_id", ColumnType::Varchar),
        Column::new("title", ColumnType::Varchar),
        Column::new("artist_id", ColumnType::Varchar),
        Column::new("year", ColumnType::Integer),
        Column::new("duration", ColumnType::Real),
    ],
    primary_key: Some("song_id"),
    sources: &["staging_songs"],
};

pub static DIM_ARTIST: TableSchema = TableSchema {
    name: "dim_artist",
    role: TableRole::Dimension,
    columns: &[
        Column::required("artist_id", ColumnType::Varchar),
        Column::new("name", ColumnType::Varchar),
        Column::new("location", ColumnType::Varchar),
        Column::new("latitude", ColumnType::Real),
        Column::new("longitude", ColumnType::Real),
    ],
    primary_key: Some("artist_id"),
    sources: &["staging_songs"],
};

pub static DIM_TIME: TableSchema = TableSchema {
    name: "dim_time",
    role: TableRole::Dimension,
    columns: &[
        Column::required("start_time", ColumnType::Timestamp),
        Column::new("hour", ColumnType::Integer),
        Column::new("day", ColumnType::Integer),
        Column::new("week", ColumnType::Integer),
        Column::new("month", ColumnType::Integer),
        Column::new("year", ColumnType::Integer),
        Column::new("weekday", ColumnType::Integer),
    ],
    primary_key: Some("start_time"),
    sources: &["fact_songplays"],
};

// =============================================================================
// Table Registry
// =============================================================================

/// All tables in drop/create order
pub static ALL_TABLES: &[&TableSchema] = &[
    &STAGING_EVENTS,
    &STAGING_SONGS,
    &FACT_SONGPLAYS,
    &DIM_USER,
    &DIM_SONG,
    &DIM_ARTIST,
    &DIM_TIME,
];

/// Tables filled by bulk copy, in load order
pub static STAGING_TABLES: &[&TableSchema] = &[&STAGING_EVENTS, &STAGING_SONGS];

/// Tables filled by insert-select, in transform order
pub static STAR_TABLES: &[&TableSchema] = &[
    &FACT_SONGPLAYS,
    &DIM_USER,
    &DIM_SONG,
    &DIM_ARTIST,
    &DIM_TIME,
];
