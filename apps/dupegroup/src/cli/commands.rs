//! # CLI Command Implementations
//!
//! Every command opens the redb database at `--database`, does its work,
//! and drops the handle before returning. Only `init` and `import` may
//! create the file; the other commands fail on a missing database.

use crate::config::FileConfig;
use crate::error::AppError;
use crate::import::parse_records;
use dupegroup_core::{
    DetectionReport, DuplicateDetector, GroupingPlan, PhotoStore, RedbStore, Summary,
    assignment_checksum, persisted_groups, persisted_summary,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of an import file (256 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(AppError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|e| {
        AppError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(AppError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
///
/// With `force`, the fresh database is built next to the old one and renamed
/// over it, so a failure leaves the existing file untouched.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), AppError> {
    if !db_path.exists() {
        let _store = RedbStore::open(db_path)?;
        println!("Initialized new database at {:?}", db_path);
        return Ok(());
    }
    if !force {
        return Err(AppError::Io(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let staging = staging_path(db_path);
    if staging.exists() {
        std::fs::remove_file(&staging)
            .map_err(|e| AppError::Io(format!("Remove stale staging file: {}", e)))?;
    }
    drop(RedbStore::open(&staging)?);
    std::fs::rename(&staging, db_path)
        .map_err(|e| AppError::Io(format!("Replace existing database: {}", e)))?;

    println!("Initialized new database at {:?}", db_path);
    Ok(())
}

/// Sibling path `init --force` builds the replacement database at.
pub fn staging_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.file_name().unwrap_or_default().to_os_string();
    name.push(".init-tmp");
    db_path.with_file_name(name)
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Insert or update photo records from a JSON or JSON Lines file.
pub fn cmd_import(db_path: &Path, json_mode: bool, file: &Path) -> Result<(), AppError> {
    tracing::info!("Importing photos from {:?}", file);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let text = std::fs::read_to_string(&validated_path)
        .map_err(|e| AppError::Io(format!("Read file: {}", e)))?;
    let records = parse_records(&text)?;

    let mut store = RedbStore::open(db_path)?;
    let written = store.upsert_photos(&records)?;
    let total = store.photo_count()?;
    tracing::debug!(written, total, "Import committed");

    if json_mode {
        print_json(&serde_json::json!({
            "imported": written,
            "total_photos": total,
        }));
        return Ok(());
    }

    println!("Imported {} photos", written);
    println!("Database now holds {} photos", total);
    Ok(())
}

// =============================================================================
// DETECT COMMAND
// =============================================================================

/// Run duplicate detection and, unless `dry_run`, persist the grouping.
pub fn cmd_detect(
    db_path: &Path,
    json_mode: bool,
    config_path: Option<&Path>,
    similarity: Option<i32>,
    chunk_size: Option<usize>,
    dry_run: bool,
) -> Result<(), AppError> {
    let config = FileConfig::discover(config_path)?.resolve(similarity, chunk_size)?;
    let detector = DuplicateDetector::new(config)?;

    tracing::info!(
        "Similarity threshold: {}% (max Hamming distance {})",
        config.similarity_percent,
        config.max_distance()
    );

    let mut store = RedbStore::open_existing(db_path)?;
    let (report, planned) = if dry_run {
        let plan = detector.plan(&store)?;
        (plan.report, planned_groups(&plan))
    } else {
        (detector.run(&mut store)?, Vec::new())
    };
    drop(store);

    log_report(&report, dry_run);

    if json_mode {
        let mut output = serde_json::to_value(report).unwrap_or_default();
        if let Some(object) = output.as_object_mut() {
            object.insert("dry_run".to_string(), serde_json::Value::Bool(dry_run));
            if dry_run {
                let groups = planned.iter().map(PlannedGroup::to_json).collect();
                object.insert("groups".to_string(), serde_json::Value::Array(groups));
            }
        }
        print_json(&output);
        return Ok(());
    }

    println!("Duplicate Detection{}", if dry_run { " (dry run)" } else { "" });
    println!("===================");
    println!(
        "Threshold:       {}% (max {} differing bits)",
        report.similarity_percent, report.max_distance
    );
    println!("Photos compared: {}", report.photos_compared);
    println!("Matching pairs:  {}", report.match_pairs);
    println!("Groups:          {}", report.summary.groups);
    println!("Grouped photos:  {}", report.summary.photos);
    println!("Hidden photos:   {}", report.summary.hidden);
    if dry_run {
        for group in &planned {
            println!();
            println!("Group {} (lead: {})", group.id, group.lead);
            for hidden in &group.hidden {
                println!("  - {}", hidden);
            }
        }
        println!();
        println!("Nothing was written.");
    }
    Ok(())
}

/// A group from a dry run, by photo identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// Sequential group number.
    pub id: u64,
    /// Identifier of the photo that stays visible.
    pub lead: String,
    /// Identifiers that would be hidden behind the lead.
    pub hidden: Vec<String>,
}

impl PlannedGroup {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "group_id": self.id,
            "lead": self.lead,
            "hidden": self.hidden,
        })
    }
}

/// Resolve the groups of a plan to photo identifiers.
pub fn planned_groups(plan: &GroupingPlan) -> Vec<PlannedGroup> {
    plan.groups
        .iter()
        .map(|group| PlannedGroup {
            id: group.id.value(),
            lead: plan.corpus.id(group.lead).to_string(),
            hidden: group
                .hidden_members()
                .map(|index| plan.corpus.id(index).to_string())
                .collect(),
        })
        .collect()
}

fn log_report(report: &DetectionReport, dry_run: bool) {
    tracing::info!("Compared {} photos", report.photos_compared);
    tracing::info!(
        pairs = report.match_pairs,
        "Found {} duplicate groups",
        report.summary.groups
    );
    if dry_run {
        tracing::info!("Dry run; stored groups unchanged");
    } else {
        tracing::info!(
            "Marked {} photos as duplicates ({} hidden)",
            report.summary.photos,
            report.summary.hidden
        );
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Photo and group counts of a store, as `status` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStatus {
    /// All stored photos.
    pub photos: usize,
    /// Photos with a hash value.
    pub hashed_photos: usize,
    /// Counts of the persisted grouping.
    pub summary: Summary,
}

impl StoreStatus {
    /// Read the counts from `store`.
    pub fn read<S: PhotoStore + ?Sized>(store: &S) -> Result<Self, AppError> {
        let photos = store.photos()?;
        Ok(Self {
            photos: photos.len(),
            hashed_photos: photos.iter().filter(|p| p.hash.is_some()).count(),
            summary: persisted_summary(store)?,
        })
    }
}

/// Show photo and group counts.
pub fn cmd_status(db_path: &Path, json_mode: bool) -> Result<(), AppError> {
    let status = StoreStatus::read(&RedbStore::open_existing(db_path)?)?;
    let summary = status.summary;

    if json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "photos": status.photos,
            "hashed_photos": status.hashed_photos,
            "groups": summary.groups,
            "grouped_photos": summary.photos,
            "hidden_photos": summary.hidden,
        }));
        return Ok(());
    }

    println!("dupegroup Status");
    println!("================");
    println!("Database: {:?}", db_path);
    println!();
    println!("Photos:         {}", status.photos);
    println!("Hashed:         {}", status.hashed_photos);
    println!("Groups:         {}", summary.groups);
    println!("Grouped photos: {}", summary.photos);
    println!("Hidden photos:  {}", summary.hidden);
    Ok(())
}

// =============================================================================
// GROUPS COMMAND
// =============================================================================

/// List each stored group with its lead and members.
pub fn cmd_groups(db_path: &Path, json_mode: bool) -> Result<(), AppError> {
    let store = RedbStore::open_existing(db_path)?;
    let groups = persisted_groups(&store)?;

    if json_mode {
        let output: Vec<serde_json::Value> = groups
            .iter()
            .map(|group| {
                serde_json::json!({
                    "group_id": group.id.value(),
                    "lead": group.lead.as_ref().map(|id| id.as_str()),
                    "members": group.members.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        print_json(&serde_json::Value::Array(output));
        return Ok(());
    }

    if groups.is_empty() {
        println!("No duplicate groups stored");
        return Ok(());
    }

    for group in &groups {
        let lead = group.lead.as_ref().map_or("<none>", |id| id.as_str());
        println!(
            "Group {} ({} photos, lead: {})",
            group.id,
            group.members.len(),
            lead
        );
        for member in &group.members {
            let marker = if Some(member) == group.lead.as_ref() { "*" } else { " " };
            println!("  {} {}", marker, member);
        }
    }
    Ok(())
}

// =============================================================================
// CHECKSUM COMMAND
// =============================================================================

/// Print the BLAKE3 checksum of the stored grouping.
pub fn cmd_checksum(db_path: &Path, json_mode: bool) -> Result<(), AppError> {
    let store = RedbStore::open_existing(db_path)?;
    let assignments = store.assignments()?;
    let checksum = assignment_checksum(&assignments);

    if json_mode {
        print_json(&serde_json::json!({
            "checksum": checksum,
            "algorithm": "BLAKE3",
            "grouped_photos": assignments.len(),
        }));
        return Ok(());
    }

    println!("BLAKE3: {}", checksum);
    Ok(())
}

// =============================================================================
// COMPACT COMMAND
// =============================================================================

/// Reclaim free pages in the database file.
pub fn cmd_compact(db_path: &Path) -> Result<(), AppError> {
    let mut store = RedbStore::open_existing(db_path)?;
    store.compact()?;
    println!("Compacted database at {:?}", db_path);
    Ok(())
}
