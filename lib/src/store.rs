//! SQLite persistence of analysis runs
//!
//! One row per run in the `user_formants` table: every track and statistic
//! block as JSON text plus the rendered plot as a blob.

use crate::channel::PerChannel;
use crate::processor::AnalysisReport;
use crate::statistics::{BreathinessStatistics, ChannelStatistics, IntonationStatistics};
use crate::track_filter::Track;
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Record store consuming finished analyses
pub trait AnalysisStore {
    /// Store one run with its rendered plot, returning the new record id
    fn persist(&mut self, report: &AnalysisReport, plot_png: &[u8]) -> Result<i64>;
}

/// One stored run as read back from the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub timestamp: String,
    pub tracks: PerChannel<Track>,
    pub averages: PerChannel<Option<f64>>,
    pub channels: PerChannel<Option<ChannelStatistics>>,
    pub intonation: IntonationStatistics,
    pub breathiness: BreathinessStatistics,
    pub scatter_plot: Vec<u8>,
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS user_formants (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp        TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    f0_json          TEXT NOT NULL CHECK (json_valid(f0_json)),
    f1_json          TEXT NOT NULL CHECK (json_valid(f1_json)),
    f2_json          TEXT NOT NULL CHECK (json_valid(f2_json)),
    f3_json          TEXT NOT NULL CHECK (json_valid(f3_json)),
    f4_json          TEXT NOT NULL CHECK (json_valid(f4_json)),
    formant_avg_json TEXT NOT NULL CHECK (json_valid(formant_avg_json)),
    statistics_json  TEXT NOT NULL CHECK (json_valid(statistics_json)),
    intonation_json  TEXT NOT NULL CHECK (json_valid(intonation_json)),
    breathiness_json TEXT NOT NULL CHECK (json_valid(breathiness_json)),
    scatter_plot     BLOB NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, f0_json, f1_json, f2_json, f3_json, f4_json,
        formant_avg_json, statistics_json, intonation_json, breathiness_json, scatter_plot
     FROM user_formants";

/// [`AnalysisStore`] backed by a SQLite file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::info!("Opened analysis database {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self { conn })
    }

    /// Number of stored runs
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM user_formants", params![], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Read back the run with the given id
    pub fn load_record(&self, id: i64) -> Result<Option<StoredRecord>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        self.query_one(&sql, params![id])
    }

    /// Read back the most recent run
    pub fn load_latest(&self) -> Result<Option<StoredRecord>> {
        let sql = format!("{} ORDER BY timestamp DESC, id DESC LIMIT 1", SELECT_COLUMNS);
        self.query_one(&sql, params![])
    }

    /// Delete every stored run, returning how many were removed
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM user_formants", params![])?;
        log::info!("Removed {} stored analyses", removed);
        Ok(removed)
    }

    fn query_one<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<StoredRecord>> {
        let raw = self
            .conn
            .query_row(sql, params, |row| {
                Ok(RawRecord {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    tracks: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?],
                    averages: row.get(7)?,
                    statistics: row.get(8)?,
                    intonation: row.get(9)?,
                    breathiness: row.get(10)?,
                    scatter_plot: row.get(11)?,
                })
            })
            .optional()?;

        raw.map(RawRecord::decode).transpose()
    }
}

impl AnalysisStore for SqliteStore {
    fn persist(&mut self, report: &AnalysisReport, plot_png: &[u8]) -> Result<i64> {
        let tracks = report
            .tracks
            .map(|_, track| serde_json::to_string(track))
            .transpose()?;

        self.conn.execute(
            "INSERT INTO user_formants (f0_json, f1_json, f2_json, f3_json, f4_json,
                formant_avg_json, statistics_json, intonation_json, breathiness_json, scatter_plot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                tracks.f0,
                tracks.f1,
                tracks.f2,
                tracks.f3,
                tracks.f4,
                serde_json::to_string(&report.averages())?,
                serde_json::to_string(&report.channels)?,
                serde_json::to_string(&report.intonation)?,
                serde_json::to_string(&report.breathiness)?,
                plot_png,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        log::info!("Stored analysis as record {}", id);
        Ok(id)
    }
}

struct RawRecord {
    id: i64,
    timestamp: String,
    tracks: [String; 5],
    averages: String,
    statistics: String,
    intonation: String,
    breathiness: String,
    scatter_plot: Vec<u8>,
}

impl RawRecord {
    fn decode(self) -> Result<StoredRecord> {
        let [f0, f1, f2, f3, f4] = self.tracks;
        let tracks = PerChannel { f0, f1, f2, f3, f4 }
            .map(|_, text| serde_json::from_str::<Track>(text))
            .transpose()?;

        Ok(StoredRecord {
            id: self.id,
            timestamp: self.timestamp,
            tracks,
            averages: serde_json::from_str(&self.averages)?,
            channels: serde_json::from_str(&self.statistics)?,
            intonation: serde_json::from_str(&self.intonation)?,
            breathiness: serde_json::from_str(&self.breathiness)?,
            scatter_plot: self.scatter_plot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::VocalAnalyzer;
    use crate::provider::MeasurementTable;

    fn report() -> AnalysisReport {
        let table = MeasurementTable::new(
            0.01,
            (0..30).map(|i| 110.0 + i as f64).collect(),
            [
                vec![600.0; 30],
                vec![1700.0; 30],
                vec![2600.0; 30],
                vec![3600.0; 30],
            ],
        );
        let mut analyzer = VocalAnalyzer::new();
        analyzer.analyze(&table).unwrap().clone()
    }

    #[test]
    fn test_persist_and_load() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let report = report();
        let png = vec![0x89, b'P', b'N', b'G'];

        let id = store.persist(&report, &png).unwrap();
        assert_eq!(store.count().unwrap(), 1);

        let record = store.load_record(id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.tracks, report.tracks);
        assert_eq!(record.averages, report.averages());
        assert_eq!(record.channels, report.channels);
        assert_eq!(record.intonation, report.intonation);
        assert_eq!(record.scatter_plot, png);
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn test_nan_statistics_are_stored_as_null() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let report = report();
        // no harmonicity data at all
        assert!(report.breathiness.mean_hnr_db.is_nan());

        let id = store.persist(&report, &[]).unwrap();
        let text: String = store
            .conn
            .query_row(
                "SELECT breathiness_json FROM user_formants WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .unwrap();
        assert!(text.contains("\"mean_hnr_db\":null"));

        let record = store.load_record(id).unwrap().unwrap();
        assert!(record.breathiness.mean_hnr_db.is_nan());
    }

    #[test]
    fn test_missing_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_record(42).unwrap().is_none());
        assert!(store.load_latest().unwrap().is_none());
    }

    #[test]
    fn test_latest_and_clear_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocal_analysis.db");
        let report = report();

        let mut store = SqliteStore::open(&path).unwrap();
        store.persist(&report, &[1]).unwrap();
        let second = store.persist(&report, &[2]).unwrap();
        drop(store);

        let mut store = SqliteStore::open(&path).unwrap();
        let latest = store.load_latest().unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.scatter_plot, vec![2]);

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
    }
}
