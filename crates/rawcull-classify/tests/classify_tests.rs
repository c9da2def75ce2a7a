use rawcull_classify::{ClassificationEngine, DeletionCode, DeletionPolicy};
use rawcull_core::{CandidateFile, DirectoryGroup};
use rawcull_scan::{DirectoryScanner, ScanConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![0u8; len]).unwrap();
}

fn raw_only_or_raw_xmp() -> DeletionPolicy {
    DeletionPolicy::from_codes([DeletionCode::RAW_ONLY, DeletionCode::RAW_XMP])
}

#[test]
fn test_end_to_end_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("a.cr2"), 500);
    write(&root.join("a.xmp"), 100);
    write(&root.join("b.cr2"), 500);
    write(&root.join("b.jpg"), 2000);

    let report = DirectoryScanner::new().scan(&ScanConfig::new(root)).unwrap();
    let plan = ClassificationEngine::new(raw_only_or_raw_xmp()).classify_report(&report);

    assert_eq!(plan.total_bytes, 600);
    assert_eq!(
        plan.paths(),
        vec![report.root.join("a.cr2"), report.root.join("a.xmp")]
    );

    let totals = plan.totals();
    assert_eq!(totals.raw_found, 2);
    assert_eq!(totals.raw_marked, 1);
    assert_eq!(totals.xmp_found, 1);
    assert_eq!(totals.xmp_marked, 1);
    assert_eq!(totals.jpeg_found, 1);
}

#[test]
fn test_companions_are_directory_scoped() {
    let a = DirectoryGroup::with_files("/a", vec![CandidateFile::new("/a/IMG_1.cr2", 10)]);
    let b = DirectoryGroup::with_files("/b", vec![CandidateFile::new("/b/IMG_1.xmp", 1)]);

    let engine = ClassificationEngine::new(DeletionPolicy::from_codes([DeletionCode::RAW_ONLY]));
    let plan = engine.classify(&[a, b]);

    // The XMP in /b does not protect the RAW in /a
    assert_eq!(plan.paths(), vec![PathBuf::from("/a/IMG_1.cr2")]);
    assert_eq!(plan.total_bytes, 10);
}

#[test]
fn test_companions_scoped_on_disk() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("a/IMG_1.cr2"), 10);
    write(&root.join("b/IMG_1.xmp"), 1);

    let report = DirectoryScanner::new().scan(&ScanConfig::new(root)).unwrap();
    let plan = ClassificationEngine::new(DeletionPolicy::default()).classify_report(&report);

    assert_eq!(plan.paths(), vec![report.root.join("a/IMG_1.cr2")]);
}

#[test]
fn test_full_triple_never_marked() {
    let group = DirectoryGroup::with_files(
        "/shoot",
        vec![
            CandidateFile::new("/shoot/x.cr2", 10),
            CandidateFile::new("/shoot/x.xmp", 1),
            CandidateFile::new("/shoot/x.jpg", 5),
        ],
    );
    let plan = ClassificationEngine::new(raw_only_or_raw_xmp()).classify(&[group]);
    assert!(plan.is_empty());
    assert_eq!(plan.total_bytes, 0);
}

#[test]
fn test_empty_policy_gives_empty_plan() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("a.cr2"), 10);

    let report = DirectoryScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();
    let plan = ClassificationEngine::new(DeletionPolicy::none()).classify_report(&report);

    assert!(plan.is_empty());
    assert_eq!(plan.directories.len(), 1);
    assert_eq!(plan.directories[0].raw_found, 1);
}

#[test]
fn test_planning_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for (dir, stem) in [("2021", "IMG_01"), ("2021", "IMG_02"), ("2022/jan", "IMG_03")] {
        write(&root.join(dir).join(format!("{stem}.CR2")), 300);
    }
    write(&root.join("2021/img_02.xmp"), 30);
    write(&root.join("2022/jan/IMG_03.jpeg"), 90);

    let engine = ClassificationEngine::new(raw_only_or_raw_xmp());
    let config = ScanConfig::new(root);

    let first = engine.classify_report(&DirectoryScanner::new().scan(&config).unwrap());
    let second = engine.classify_report(&DirectoryScanner::new().scan(&config).unwrap());

    assert_eq!(first, second);
    assert_eq!(first.file_count(), 3);
    assert_eq!(first.total_bytes, 630);
}

#[test]
fn test_lrdata_contents_never_planned() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("Catalog Previews.lrdata/IMG_9.cr2"), 10);
    write(&root.join("IMG_1.cr2"), 10);

    let report = DirectoryScanner::new().scan(&ScanConfig::new(root)).unwrap();
    let plan = ClassificationEngine::new(DeletionPolicy::default()).classify_report(&report);

    assert_eq!(plan.paths(), vec![report.root.join("IMG_1.cr2")]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_sidecar_keeps_raw() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("shoot/a.cr2"), 500);
    write(&root.join("sidecars/a.xmp"), 100);
    std::os::unix::fs::symlink("../sidecars/a.xmp", root.join("shoot/a.xmp")).unwrap();

    let report = DirectoryScanner::new().scan(&ScanConfig::new(root)).unwrap();
    let shoot = report.group(&report.root.join("shoot")).unwrap();
    assert_eq!(shoot.len(), 2);
    assert_eq!(shoot.files[1].size, 100);

    let plan = ClassificationEngine::new(DeletionPolicy::default()).classify_report(&report);
    assert!(plan.is_empty(), "edited RAW marked: {:?}", plan.paths());

    let plan = ClassificationEngine::new(raw_only_or_raw_xmp()).classify_report(&report);
    assert_eq!(
        plan.paths(),
        vec![report.root.join("shoot/a.cr2"), report.root.join("shoot/a.xmp")]
    );
}
