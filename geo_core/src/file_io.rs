//! # File I/O
//!
//! Everything that touches disk goes through here:
//!
//! - `.bulbo` project files (pretty JSON, atomic replace, schema check)
//! - advisory `.bulbo.lock` files so two engineers don't edit one job
//! - analysis request files and the result exports (CSV bulb, JSON outcome)
//!
//! Writes go to a sibling `.tmp` file that is synced and then renamed over
//! the target, so a crash never leaves a half-written file behind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use geo_core::file_io::{load_project, save_project, FileLock};
//! use geo_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("24-117.bulbo");
//! let _lock = FileLock::acquire(path, "ana@escritorio.com.br")?;
//!
//! let project = Project::new("Ana Souza", "24-117", "Construtora Norte");
//! save_project(&project, path)?;
//! let again = load_project(path)?;
//! assert_eq!(again.meta.job_id, "24-117");
//! # Ok::<(), geo_core::errors::GeoError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOutcome, AnalysisRequest};
use crate::errors::{GeoError, GeoResult};
use crate::project::{Project, SCHEMA_VERSION};
use crate::report::BulbTable;

/// Project file extension
pub const PROJECT_EXTENSION: &str = "bulbo";

/// Locks older than this are taken over regardless of owner
pub const STALE_LOCK_HOURS: i64 = 24;

// ============================================================================
// Helpers
// ============================================================================

fn io_error<'a>(operation: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> GeoError + 'a {
    move |e| GeoError::file_error(operation, path.display().to_string(), e.to_string())
}

/// `path` with `suffix` appended to its full file name
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Replace `path` with `bytes` through a synced temporary file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> GeoResult<()> {
    let tmp_path = with_suffix(path, ".tmp");

    let mut tmp = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp.write_all(bytes).map_err(io_error("write temp file", &tmp_path))?;
    tmp.sync_all().map_err(io_error("sync temp file", &tmp_path))?;
    drop(tmp);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error("replace", path)(e));
    }
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn read_text(path: &Path) -> GeoResult<String> {
    fs::read_to_string(path).map_err(io_error("read", path))
}

fn hostname() -> String {
    ["HOSTNAME", "COMPUTERNAME", "HOST"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// Locking
// ============================================================================

/// Contents of a `.bulbo.lock` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (email or login)
    pub owner: String,
    pub host: String,
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn for_current_process(owner: impl Into<String>) -> Self {
        LockInfo {
            owner: owner.into(),
            host: hostname(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    /// A lock is stale when it is too old, or when it was taken on this
    /// host by a process that no longer exists.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        if now - self.acquired_at > Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        self.host == hostname() && !process_alive(self.pid)
    }

    fn holder(&self) -> String {
        format!("{} ({}, pid {})", self.owner, self.host, self.pid)
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists() || !Path::new("/proc/self").exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive edit lock on a project file.
///
/// Holds an OS lock (fs2) on the lock file and writes a [`LockInfo`] into it
/// so other users can see who has the job open. Dropping the guard removes
/// the lock file.
#[derive(Debug)]
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Lock `path` for `owner`; `FileLocked` when someone else holds it.
    pub fn acquire(path: &Path, owner: impl Into<String>) -> GeoResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(existing) = Self::check(path) {
            return Err(GeoError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.acquired_at.to_rfc3339(),
            ));
        }

        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;

        handle
            .try_lock_exclusive()
            .map_err(|_| GeoError::file_locked(path.display().to_string(), "another process", "unknown"))?;
        // Only the holder of the OS lock may clear the previous contents.
        handle.set_len(0).map_err(io_error("reset lock", &lock_path))?;

        let info = LockInfo::for_current_process(owner);
        let body = serde_json::to_vec_pretty(&info).map_err(GeoError::serialization)?;
        handle.write_all(&body).map_err(io_error("write lock", &lock_path))?;
        handle.sync_all().map_err(io_error("sync lock", &lock_path))?;

        log::info!("Locked {} for {}", path.display(), info.owner);
        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current live lock on `path`, if any. Stale and unreadable lock files
    /// count as unlocked.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let text = fs::read_to_string(lock_path_for(path)).ok()?;
        let info: LockInfo = serde_json::from_str(&text).ok()?;
        if info.is_stale(Utc::now()) {
            log::warn!("Ignoring stale lock on {} held by {}", path.display(), info.holder());
            None
        } else {
            Some(info)
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `job.bulbo` → `job.bulbo.lock`
pub fn lock_path_for(project_path: &Path) -> PathBuf {
    with_suffix(project_path, ".lock")
}

// ============================================================================
// Projects
// ============================================================================

/// Write `project` as pretty JSON, replacing `path` atomically.
pub fn save_project(project: &Project, path: &Path) -> GeoResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(GeoError::serialization)?;
    write_atomic(path, json.as_bytes())?;
    log::info!(
        "Saved project {} ({} analyses) to {}",
        project.meta.job_id,
        project.analysis_count(),
        path.display()
    );
    Ok(())
}

/// Read a project and check its schema version.
pub fn load_project(path: &Path) -> GeoResult<Project> {
    let text = read_text(path)?;
    let project: Project = serde_json::from_str(&text)
        .map_err(|e| GeoError::serialization(format!("invalid project file {}: {}", path.display(), e)))?;
    check_schema_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project along with the live lock on it, if any. A `Some` lock
/// means the caller should treat the project as read-only.
pub fn load_project_with_lock_check(path: &Path) -> GeoResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let mut parts = version.trim().split('.').map(|p| p.parse::<u32>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor, patch))
}

/// Accept files with the same major version, and for 0.x schemas reject
/// files written by a newer minor version.
pub fn check_schema_version(file_version: &str) -> GeoResult<()> {
    let mismatch = || GeoError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file = parse_version(file_version).ok_or_else(mismatch)?;
    let ours = parse_version(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file.0 != ours.0 || (ours.0 == 0 && file.1 > ours.1) {
        return Err(mismatch());
    }
    Ok(())
}

// ============================================================================
// Requests and exports
// ============================================================================

/// Read a JSON [`AnalysisRequest`].
pub fn load_request(path: &Path) -> GeoResult<AnalysisRequest> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|e| GeoError::serialization(format!("invalid request file {}: {}", path.display(), e)))
}

/// Write the stress bulb of `outcome` as CSV.
pub fn export_bulb_csv(outcome: &AnalysisOutcome, path: &Path) -> GeoResult<usize> {
    let table = BulbTable::from_bulb(&outcome.bulb);
    write_atomic(path, table.to_csv().as_bytes())?;
    Ok(table.len())
}

/// Write the full outcome as pretty JSON.
pub fn export_outcome_json(outcome: &AnalysisOutcome, path: &Path) -> GeoResult<()> {
    let json = serde_json::to_string_pretty(outcome).map_err(GeoError::serialization)?;
    write_atomic(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::settings::Settings;
    use std::env::temp_dir;

    fn scratch(name: &str, ext: &str) -> PathBuf {
        temp_dir().join(format!("geo_core_{}_{}.{}", name, std::process::id(), ext))
    }

    #[test]
    fn test_sidecar_paths() {
        let p = Path::new("/jobs/24-117.bulbo");
        assert_eq!(lock_path_for(p), Path::new("/jobs/24-117.bulbo.lock"));
        assert_eq!(with_suffix(p, ".tmp"), Path::new("/jobs/24-117.bulbo.tmp"));
    }

    #[test]
    fn test_project_roundtrip_with_analysis() {
        let path = scratch("roundtrip", PROJECT_EXTENSION);
        let mut project = Project::new("Ana Souza", "24-117", "Construtora Norte");
        let id = project.add_analysis(AnalysisRequest::example());
        project.settings.safety_factor = 2.5;

        save_project(&project, &path).unwrap();
        assert!(!with_suffix(&path, ".tmp").exists());

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.job_id, "24-117");
        assert_eq!(loaded.settings.safety_factor, 2.5);
        assert_eq!(loaded.get_analysis(&id), Some(&AnalysisRequest::example()));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = scratch("garbage", PROJECT_EXTENSION);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_project(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);

        let missing = scratch("missing", PROJECT_EXTENSION);
        assert_eq!(load_project(&missing).unwrap_err().error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_lock_blocks_second_owner() {
        let path = scratch("lock", PROJECT_EXTENSION);
        let lock = FileLock::acquire(&path, "ana").unwrap();
        assert!(lock_path_for(&path).exists());
        assert_eq!(FileLock::check(&path).map(|i| i.owner), Some("ana".to_string()));

        let err = FileLock::acquire(&path, "bruno").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_failed_acquire_keeps_lock_contents() {
        let path = scratch("lock_contents", PROJECT_EXTENSION);
        let lock = FileLock::acquire(&path, "ana").unwrap();

        // An old timestamp makes `check` skip the file, so the second caller
        // only finds out at the OS lock.
        let mut info = lock.info.clone();
        info.acquired_at = Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1);
        let body = serde_json::to_string_pretty(&info).unwrap();
        fs::write(lock_path_for(&path), &body).unwrap();

        let err = FileLock::acquire(&path, "bruno").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert_eq!(fs::read_to_string(lock_path_for(&path)).unwrap(), body);

        drop(lock);
        assert!(!lock_path_for(&path).exists());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::for_current_process("ana");
        assert!(!info.is_stale(Utc::now()));
        info.acquired_at = Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(info.is_stale(Utc::now()));
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = scratch("lock_check", PROJECT_EXTENSION);
        save_project(&Project::new("Eng", "J-9", "Client"), &path).unwrap();
        let (project, lock) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(project.meta.job_id, "J-9");
        assert!(lock.is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_schema_versions() {
        assert!(check_schema_version(SCHEMA_VERSION).is_ok());
        assert!(check_schema_version("0.1.7").is_ok());
        assert!(check_schema_version("0.0.3").is_ok());
        assert!(check_schema_version("0.2.0").is_err());
        assert!(check_schema_version("1.0.0").is_err());
        assert!(check_schema_version("abc").is_err());
    }

    #[test]
    fn test_exports() {
        let mut request = AnalysisRequest::example();
        request.grid.resolution = 3;
        let outcome = analyze(&request, &Settings::default()).unwrap();

        let csv = scratch("bulb", "csv");
        assert_eq!(export_bulb_csv(&outcome, &csv).unwrap(), 27);
        let text = fs::read_to_string(&csv).unwrap();
        assert!(text.starts_with("x,y,z,delta_sigma_z,influence_pct,valid"));
        assert_eq!(text.lines().count(), 28);

        let json = scratch("outcome", "json");
        export_outcome_json(&outcome, &json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert!(value["bearing"]["ultimate_kpa"].as_f64().unwrap() > 0.0);

        let _ = fs::remove_file(&csv);
        let _ = fs::remove_file(&json);
    }

    #[test]
    fn test_load_request() {
        let path = scratch("request", "json");
        fs::write(&path, serde_json::to_string(&AnalysisRequest::example()).unwrap()).unwrap();
        assert_eq!(load_request(&path).unwrap(), AnalysisRequest::example());
        let _ = fs::remove_file(&path);
    }
}
