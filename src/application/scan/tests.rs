use super::*;
use std::fs::File;
use std::time::Duration;
use tempfile::tempdir;

fn touch(path: &Path, secs: u64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn names(set: &BundleSet) -> Vec<&str> {
    set.identities().map(|i| i.as_str()).collect()
}

#[test]
fn webapp_scan_lists_directories_only() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("console")).unwrap();
    fs::create_dir(dir.path().join("root")).unwrap();
    fs::create_dir(dir.path().join(".staging")).unwrap();
    fs::write(dir.path().join("notes.txt"), "x").unwrap();

    let scanner = BundleScanner::new(dir.path(), BundleKind::Webapp);
    let set = scanner.scan();

    assert_eq!(names(&set), vec!["console", "root"]);
    assert!(set.iter().all(|b| b.kind() == BundleKind::Webapp));
}

#[test]
fn context_scan_lists_toml_files_by_stem() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("media.toml"), "war = \"x\"").unwrap();
    fs::write(dir.path().join(".hidden.toml"), "war = \"x\"").unwrap();
    fs::write(dir.path().join("readme.md"), "x").unwrap();
    fs::create_dir(dir.path().join("nested.toml")).unwrap();

    let scanner = BundleScanner::new(dir.path(), BundleKind::ContextFile);
    let set = scanner.scan();

    assert_eq!(names(&set), vec!["media"]);
    let bundle = set.get(&Identity::new("media")).unwrap();
    assert_eq!(bundle.path(), dir.path().join("media.toml"));
}

#[test]
fn scan_is_idempotent() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("console/WEB-INF/lib")).unwrap();
    fs::write(dir.path().join("console/WEB-INF/web.toml"), "").unwrap();

    let scanner = BundleScanner::new(dir.path(), BundleKind::Webapp);
    assert_eq!(scanner.scan(), scanner.scan());
}

#[test]
fn missing_root_is_noticed_once() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("webapps");
    let scanner = BundleScanner::new(&root, BundleKind::Webapp);

    assert_eq!(
        scanner.try_scan().unwrap(),
        ScanOutcome::RootMissing { first_notice: true }
    );
    assert_eq!(
        scanner.try_scan().unwrap(),
        ScanOutcome::RootMissing { first_notice: false }
    );
    assert!(scanner.scan().is_empty());

    fs::create_dir(&root).unwrap();
    fs::create_dir(root.join("console")).unwrap();
    assert_eq!(names(&scanner.scan()), vec!["console"]);

    fs::remove_dir_all(&root).unwrap();
    assert_eq!(
        scanner.try_scan().unwrap(),
        ScanOutcome::RootMissing { first_notice: true }
    );
}

#[test]
fn webapp_timestamp_tracks_descriptor_and_libraries() {
    let dir = tempdir().unwrap();
    let app = dir.path().join("console");
    fs::create_dir_all(app.join("WEB-INF/lib")).unwrap();
    let descriptor = app.join("WEB-INF/web.toml");
    let library = app.join("WEB-INF/lib/app.dex");
    fs::write(&descriptor, "").unwrap();
    fs::write(&library, "dex").unwrap();

    let before = webapp_timestamp(&app);

    let later = SystemTime::now() + Duration::from_secs(3600);
    File::options()
        .write(true)
        .open(&library)
        .unwrap()
        .set_modified(later)
        .unwrap();
    assert_eq!(webapp_timestamp(&app), later);
    assert!(webapp_timestamp(&app) > before);

    let even_later = later + Duration::from_secs(60);
    File::options()
        .write(true)
        .open(&descriptor)
        .unwrap()
        .set_modified(even_later)
        .unwrap();
    assert_eq!(webapp_timestamp(&app), even_later);
}

#[test]
fn context_file_timestamp_is_file_mtime() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("media.toml");
    fs::write(&file, "war = \"x\"").unwrap();
    touch(&file, 1_000);

    let set = BundleScanner::new(dir.path(), BundleKind::ContextFile).scan();
    assert_eq!(
        set.get(&Identity::new("media")).unwrap().modified(),
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000)
    );
}
