use neuroscan_core::{
    CandidateFile, GLIOMA_VERDICT, GuardOutcome, MemorySessionStore, Phase, PreviewRegistry,
    Route, SimulatedAnalyzer, UploadPage,
};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 200, 200, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn page(delay: Duration) -> UploadPage {
    let analyzer = SimulatedAnalyzer {
        delay,
        ..Default::default()
    };
    UploadPage::new(Arc::new(analyzer), PreviewRegistry::new(64))
}

#[test]
fn without_session_only_redirects() {
    let mut page = page(Duration::from_millis(10));
    let mut nav = Vec::new();
    let outcome = page.mount(&MemorySessionStore::default(), &mut nav);
    assert_eq!(outcome, GuardOutcome::Redirected);
    assert_eq!(nav, vec![Route::Login]);
    assert_eq!(page.phase(), Phase::Idle);
    assert!(page.selected().is_none());
}

#[test]
fn drop_preview_analyze_result() {
    let delay = Duration::from_millis(50);
    let mut page = page(delay);
    let mut nav = Vec::new();
    let store = MemorySessionStore::signed_in("radiologist");
    assert_eq!(page.mount(&store, &mut nav), GuardOutcome::Allowed);
    assert!(nav.is_empty());

    assert!(page.accept_files(vec![
        CandidateFile::from_bytes("scan.png", png_bytes()).with_mime("image/png")
    ]));
    let preview = page.preview().expect("preview shown");
    assert!(preview.image().is_some());
    assert!(page.can_analyze());

    let started = Instant::now();
    assert!(page.analyze());
    assert!(page.is_processing());
    assert!(!page.can_analyze());

    let deadline = started + Duration::from_secs(5);
    while page.is_processing() {
        page.poll();
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(5));
    }
    assert!(started.elapsed() >= delay);
    assert_eq!(page.phase(), Phase::Done);
    assert_eq!(
        page.result(),
        Some("🧠 Glioma tumor detected in the left hemisphere.")
    );
    assert_eq!(page.result(), Some(GLIOMA_VERDICT));
    assert!(page.can_analyze());
}

#[test]
fn two_files_in_one_drop_keep_the_first() {
    let mut page = page(Duration::from_millis(10));
    page.accept_files(vec![
        CandidateFile::from_bytes("first.jpg", vec![1u8]),
        CandidateFile::from_bytes("second.png", vec![2u8]),
    ]);
    assert_eq!(page.selected().map(|f| f.name.as_str()), Some("first.jpg"));
}

#[test]
fn still_processing_before_delay_elapses() {
    let mut page = page(Duration::from_millis(300));
    page.accept_files(vec![CandidateFile::from_bytes("scan.png", png_bytes())]);
    page.analyze();
    thread::sleep(Duration::from_millis(20));
    page.poll();
    assert!(page.is_processing());
    assert!(page.result().is_none());
}
