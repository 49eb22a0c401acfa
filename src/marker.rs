//! Marker files: `touch`, and a timestamp file that tells a periodic job whether the
//! day or the month changed since its last run.

use std::io;
use std::path::Path;

use chrono::{DateTime, Datelike, Local, SecondsFormat};

use crate::{fsx as fs, TarkitError};

/// Creates `path` empty. An existing file is removed and recreated so its timestamps
/// are fresh and its content is gone.
pub fn touch(path: &Path) -> Result<(), TarkitError> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(TarkitError::io(path, e)),
    }
    fs::File::create(path).map_err(TarkitError::at(path))?;
    Ok(())
}

/// Whether the calendar day and/or month differ from the previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayMonthChange {
    pub day_changed: bool,
    pub month_changed: bool,
}

/// Compares the RFC 3339 timestamp stored in `stamp_path` with the current local time,
/// then stores the current time. A missing stamp file counts as "ran just now".
pub fn should_run_day_month(stamp_path: &Path) -> Result<DayMonthChange, TarkitError> {
    day_month_change_at(stamp_path, Local::now())
}

pub(crate) fn day_month_change_at(stamp_path: &Path, now: DateTime<Local>) -> Result<DayMonthChange, TarkitError> {
    let now_text = now.to_rfc3339_opts(SecondsFormat::Secs, false);
    let content = match fs::read_to_string(stamp_path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::write(stamp_path, &now_text).map_err(TarkitError::at(stamp_path))?;
            return Ok(DayMonthChange::default());
        }
        Err(e) => return Err(TarkitError::io(stamp_path, e)),
    };

    let last = DateTime::parse_from_rfc3339(content.trim())
        .map_err(|e| TarkitError::Other(format!("bad timestamp in {}: {}", stamp_path.display(), e).into()))?
        .with_timezone(&Local);

    let change = DayMonthChange {
        day_changed: last.date_naive() != now.date_naive(),
        month_changed: (last.year(), last.month()) != (now.year(), now.month()),
    };

    fs::write(stamp_path, &now_text).map_err(TarkitError::at(stamp_path))?;
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
    }

    #[test]
    fn touch_creates_and_empties() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("flag");
        touch(&p).unwrap();
        assert_eq!(fs::metadata(&p).unwrap().len(), 0);

        fs::write(&p, b"stale").unwrap();
        touch(&p).unwrap();
        assert_eq!(fs::metadata(&p).unwrap().len(), 0);
    }

    #[test]
    fn first_run_creates_stamp_without_changes() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("last_run");
        let change = day_month_change_at(&p, local(2024, 3, 10, 12)).unwrap();
        assert_eq!(change, DayMonthChange::default());
        assert!(fs::read_to_string(&p).unwrap().starts_with("2024-03-10T12:00:00"));
    }

    #[test]
    fn detects_day_then_month_changes() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("last_run");
        day_month_change_at(&p, local(2024, 3, 10, 12)).unwrap();

        let same_day = day_month_change_at(&p, local(2024, 3, 10, 18)).unwrap();
        assert_eq!(same_day, DayMonthChange { day_changed: false, month_changed: false });

        let next_day = day_month_change_at(&p, local(2024, 3, 11, 9)).unwrap();
        assert_eq!(next_day, DayMonthChange { day_changed: true, month_changed: false });

        let next_month = day_month_change_at(&p, local(2024, 4, 1, 9)).unwrap();
        assert_eq!(next_month, DayMonthChange { day_changed: true, month_changed: true });
    }

    #[test]
    fn same_day_one_year_later_is_a_change() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("last_run");
        let then = local(2023, 6, 15, 10);
        day_month_change_at(&p, then).unwrap();
        let change = day_month_change_at(&p, then + Duration::days(366)).unwrap();
        assert!(change.day_changed);
        assert!(change.month_changed);
    }

    #[test]
    fn garbage_stamp_is_an_error() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("last_run");
        fs::write(&p, "yesterday-ish").unwrap();
        assert!(should_run_day_month(&p).is_err());
    }
}
