//! Append-only experiment bookkeeping.
//!
//! Four metric files under the results directory collect one line per run,
//! `<f> <struct> <threads> <trailing_bits> <level> <value>`, and the
//! `conf_avg/` directory keeps one single-line file per argument listing
//! every value seen so far, for the averaging scripts. Directories and
//! files are created on first use; metric writes only ever append.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use dpstore::StoreStats;

use crate::error::{Error, Result};

/// The configuration prefix common to every metric line.
#[derive(Clone, Copy, Debug)]
pub struct RunLabel<'a> {
    /// Curve bit size.
    pub nb_bits: u32,
    /// Store name as logged (`PRTL` / `hash_unix`).
    pub store: &'a str,
    /// Worker count.
    pub nb_threads: usize,
    /// Distinguishing-zero count.
    pub trailing_bits: u32,
    /// Store level.
    pub level: u8,
}

/// Bookkeeping sink rooted at a results directory.
pub struct ResultsLog {
    dir: PathBuf,
}

impl ResultsLog {
    /// Sink rooted at `dir` (conventionally `results/`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        |source| Error::Io {
            path: path.to_owned(),
            source,
        }
    }

    /// Appends `<label> <value>` to `<dir>/<file>`.
    pub fn append(&self, file: &str, label: &RunLabel<'_>, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(Self::io_err(&self.dir))?;
        let path = self.dir.join(file);
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(Self::io_err(&path))?;
        writeln!(
            out,
            "{} {} {} {} {} {}",
            label.nb_bits, label.store, label.nb_threads, label.trailing_bits, label.level, value
        )
        .map_err(Self::io_err(&path))
    }

    /// Records one finished run across the four metric files.
    pub fn record_run(
        &self,
        label: &RunLabel<'_>,
        time_micros: u128,
        stats: &StoreStats,
    ) -> Result<()> {
        self.append("time.all", label, &time_micros.to_string())?;
        self.append("memory.all", label, &stats.bytes.to_string())?;
        self.append("points.all", label, &stats.points.to_string())?;
        self.append(
            "rate.all",
            label,
            &format!("{:.2} ({:.2})", stats.rate_of_use, stats.rate_slots),
        )
    }

    /// Adds `value` to `conf_avg/<name>.conf` unless it is already listed.
    /// The file holds a single line of space-separated values.
    pub fn update_conf(&self, name: &str, value: &str) -> Result<()> {
        let dir = self.dir.join("conf_avg");
        fs::create_dir_all(&dir).map_err(Self::io_err(&dir))?;
        let path = dir.join(format!("{name}.conf"));

        let existing = fs::read_to_string(&path).unwrap_or_default();
        if existing.split_whitespace().any(|seen| seen == value) {
            return Ok(());
        }
        let line = if existing.trim().is_empty() {
            value.to_owned()
        } else {
            format!("{} {value}", existing.trim_end())
        };
        fs::write(&path, line).map_err(Self::io_err(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pcs-results-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn label() -> RunLabel<'static> {
        RunLabel {
            nb_bits: 35,
            store: "PRTL",
            nb_threads: 4,
            trailing_bits: 8,
            level: 7,
        }
    }

    #[test]
    fn metric_lines_append_with_the_common_prefix() {
        let dir = scratch_dir("append");
        let log = ResultsLog::new(&dir);
        log.append("time.all", &label(), "123456").unwrap();
        log.append("time.all", &label(), "654321").unwrap();
        let written = fs::read_to_string(dir.join("time.all")).unwrap();
        assert_eq!(written, "35 PRTL 4 8 7 123456\n35 PRTL 4 8 7 654321\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn record_run_writes_all_four_files() {
        let dir = scratch_dir("record");
        let log = ResultsLog::new(&dir);
        let stats = StoreStats {
            bytes: 4096,
            points: 907,
            rate_of_use: 93.75,
            rate_slots: 62.5,
        };
        log.record_run(&label(), 1_000_000, &stats).unwrap();
        for file in ["time.all", "memory.all", "points.all", "rate.all"] {
            assert!(dir.join(file).is_file(), "{file} missing");
        }
        let rate = fs::read_to_string(dir.join("rate.all")).unwrap();
        assert_eq!(rate, "35 PRTL 4 8 7 93.75 (62.50)\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn conf_updates_are_idempotent() {
        let dir = scratch_dir("conf");
        let log = ResultsLog::new(&dir);
        log.update_conf("f", "35").unwrap();
        log.update_conf("f", "40").unwrap();
        log.update_conf("f", "35").unwrap();
        let conf = fs::read_to_string(dir.join("conf_avg/f.conf")).unwrap();
        assert_eq!(conf, "35 40");
        fs::remove_dir_all(&dir).unwrap();
    }
}
