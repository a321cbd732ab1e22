use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use pixview_core::gallery::{scan_folder, FolderNavigator, Slideshow, SlideshowTick};
use pixview_core::AppError;

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"").unwrap();
    }
}

#[test]
fn test_scan_lists_supported_images_sorted() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["c.png", "a.JPG", "notes.txt", "b.webp"]);
    fs::create_dir(dir.path().join("sub.png")).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    touch(&dir.path().join("nested"), &["deep.png"]);

    let files = scan_folder(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.JPG", "b.webp", "c.png"]);
}

#[test]
fn test_scan_missing_folder_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = scan_folder(&dir.path().join("missing"));
    assert!(result.is_err());
}

#[test]
fn test_navigation_stops_at_ends() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["1.png", "2.png", "3.png"]);

    let mut nav = FolderNavigator::for_file(&dir.path().join("2.png")).unwrap();
    assert_eq!(nav.index(), Some(1));

    assert!(nav.next().unwrap().ends_with("3.png"));
    assert!(!nav.has_next());
    assert!(matches!(nav.next(), Err(AppError::NoNeighbour)));
    assert_eq!(nav.index(), Some(2));

    nav.previous().unwrap();
    assert!(nav.previous().unwrap().ends_with("1.png"));
    assert!(matches!(nav.previous(), Err(AppError::NoNeighbour)));
    assert_eq!(nav.current().map(|p| p.ends_with("1.png")), Some(true));
}

#[test]
fn test_filmstrip_select() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["a.png", "b.png"]);
    let mut nav = FolderNavigator::for_file(&dir.path().join("a.png")).unwrap();

    assert!(nav.select(1).unwrap().ends_with("b.png"));
    assert!(matches!(nav.select(7), Err(AppError::NoNeighbour)));
    assert_eq!(nav.index(), Some(1));
}

#[test]
fn test_slideshow_needs_two_files() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["only.png"]);
    let nav = FolderNavigator::for_file(&dir.path().join("only.png")).unwrap();

    let err = Slideshow::start(&nav, Duration::from_secs(3), Instant::now()).unwrap_err();
    assert!(matches!(err, AppError::NotEnoughFiles));
}

#[test]
fn test_slideshow_runs_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["a.png", "b.png", "c.png"]);
    let mut nav = FolderNavigator::for_file(&dir.path().join("a.png")).unwrap();

    let interval = Duration::from_secs(3);
    let t0 = Instant::now();
    let mut show = Slideshow::start(&nav, interval, t0).unwrap();
    assert_eq!(show.interval(), interval);

    assert_eq!(show.tick(&mut nav, t0 + Duration::from_secs(1)), SlideshowTick::Wait);
    assert_eq!(show.remaining(t0 + Duration::from_secs(1)), Duration::from_secs(2));

    match show.tick(&mut nav, t0 + interval) {
        SlideshowTick::Show(path) => assert!(path.ends_with("b.png")),
        other => panic!("expected b.png, got {other:?}"),
    }
    match show.tick(&mut nav, t0 + interval * 2) {
        SlideshowTick::Show(path) => assert!(path.ends_with("c.png")),
        other => panic!("expected c.png, got {other:?}"),
    }
    assert_eq!(show.tick(&mut nav, t0 + interval * 3), SlideshowTick::Finished);
}
