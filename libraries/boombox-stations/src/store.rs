//! Station store
//!
//! SQLite persistence for the station list, one record per station keyed
//! by identifier. `open` reports whether the schema was just created so
//! the composition root can trigger the initial remote catalog fetch.

use crate::error::{Result, StationError};
use crate::types::{NowPlayingParams, Station};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

/// SQLite-backed station store
pub struct StationStore {
    pool: SqlitePool,
}

impl StationStore {
    /// Open the store, creating the schema when missing
    ///
    /// The second value is true when the store was just created.
    ///
    /// # Errors
    /// Returns an error if the connection fails or migrations fail
    pub async fn open(database_url: &str) -> Result<(Self, bool)> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let existing =
            sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'stations'")
                .fetch_optional(&pool)
                .await?;
        let created = existing.is_none();

        Self::run_migrations(&pool).await?;

        Ok((Self { pool }, created))
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let (store, _) = Self::open("sqlite::memory:").await?;
        Ok(store)
    }

    /// Run schema migrations
    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        // Embedded migrations for reliability
        const MIGRATIONS: &[&str] =
            &[include_str!("../migrations/20240901000001_create_stations.sql")];

        for migration in MIGRATIONS {
            sqlx::query(migration)
                .execute(pool)
                .await
                .map_err(|e| StationError::Migration(e.to_string()))?;
        }

        Ok(())
    }

    /// All stations, sorted lexicographically by name
    pub async fn all(&self) -> Result<Vec<Station>> {
        let rows = sqlx::query(
            "SELECT id, name, src, now_playing_parser, now_playing_params, changed_by_user, deleted
             FROM stations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::station_from_row).collect()
    }

    /// Look up one station by identifier
    pub async fn get(&self, id: &str) -> Result<Option<Station>> {
        let row = sqlx::query(
            "SELECT id, name, src, now_playing_parser, now_playing_params, changed_by_user, deleted
             FROM stations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::station_from_row).transpose()
    }

    /// Insert or overwrite one station
    pub async fn upsert(&self, station: &Station) -> Result<()> {
        let params = station
            .now_playing_params
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "INSERT INTO stations (id, name, src, now_playing_parser, now_playing_params, changed_by_user, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                src = excluded.src,
                now_playing_parser = excluded.now_playing_parser,
                now_playing_params = excluded.now_playing_params,
                changed_by_user = excluded.changed_by_user,
                deleted = excluded.deleted",
        )
        .bind(&station.id)
        .bind(&station.name)
        .bind(&station.src)
        .bind(&station.now_playing_parser)
        .bind(params)
        .bind(i64::from(station.changed_by_user))
        .bind(i64::from(station.deleted))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn station_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Station> {
        let params = row
            .get::<Option<String>, _>("now_playing_params")
            .map(|text| serde_json::from_str::<NowPlayingParams>(&text))
            .transpose()?;

        Ok(Station {
            id: row.get("id"),
            name: row.get("name"),
            src: row.get("src"),
            title: None,
            now_playing_parser: row.get("now_playing_parser"),
            now_playing_params: params,
            changed_by_user: row.get::<i64, _>("changed_by_user") != 0,
            deleted: row.get::<i64, _>("deleted") != 0,
        })
    }
}
