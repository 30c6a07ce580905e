use rust_slideshow::processing::layout::{ViewportFit, center_offset};

#[test]
fn landscape_in_4_3_viewport_is_letterboxed() {
    let fit = ViewportFit::contain(1920, 1080, 1024, 768).unwrap();
    assert_eq!(
        fit,
        ViewportFit {
            x: 0,
            y: 96,
            width: 1024,
            height: 576
        }
    );
}

#[test]
fn portrait_in_4_3_viewport_is_pillarboxed() {
    let fit = ViewportFit::contain(1080, 1920, 1024, 768).unwrap();
    assert_eq!(
        fit,
        ViewportFit {
            x: 296,
            y: 0,
            width: 432,
            height: 768
        }
    );
}

#[test]
fn matching_aspect_fills_viewport() {
    let fit = ViewportFit::contain(800, 600, 1024, 768).unwrap();
    assert_eq!((fit.x, fit.y, fit.width, fit.height), (0, 0, 1024, 768));
    let fit = ViewportFit::contain(10, 10, 300, 300).unwrap();
    assert_eq!((fit.width, fit.height), (300, 300));
}

#[test]
fn small_images_are_upscaled() {
    let fit = ViewportFit::contain(16, 9, 1600, 1200).unwrap();
    assert_eq!((fit.width, fit.height), (1600, 900));
    assert_eq!((fit.x, fit.y), (0, 150));
}

#[test]
fn extreme_aspect_keeps_at_least_one_pixel() {
    let fit = ViewportFit::contain(10_000, 1, 100, 100).unwrap();
    assert_eq!((fit.width, fit.height), (100, 1));
    let fit = ViewportFit::contain(1, 10_000, 100, 100).unwrap();
    assert_eq!((fit.width, fit.height), (1, 100));
}

#[test]
fn fit_never_exceeds_viewport() {
    for (sw, sh) in [(3, 7), (7, 3), (1366, 768), (4000, 3000), (1, 1)] {
        for (vw, vh) in [(1, 1), (640, 480), (1920, 1080), (333, 999)] {
            let fit = ViewportFit::contain(sw, sh, vw, vh).unwrap();
            assert!(fit.x + fit.width <= vw, "{sw}x{sh} in {vw}x{vh}");
            assert!(fit.y + fit.height <= vh, "{sw}x{sh} in {vw}x{vh}");
            assert!(fit.width == vw || fit.height == vh);
        }
    }
}

#[test]
fn zero_dimensions_have_no_fit() {
    assert_eq!(ViewportFit::contain(0, 10, 100, 100), None);
    assert_eq!(ViewportFit::contain(10, 0, 100, 100), None);
    assert_eq!(ViewportFit::contain(10, 10, 0, 100), None);
    assert_eq!(ViewportFit::contain(10, 10, 100, 0), None);
}

#[test]
fn center_offset_saturates() {
    assert_eq!(center_offset(100, 50, 300, 150), (100, 50));
    assert_eq!(center_offset(400, 50, 300, 150), (0, 50));
}
