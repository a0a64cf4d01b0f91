use itertools::Itertools;
use rand::prelude::*;

use image::RgbImage;
use motion_centroid::test_util::{uniform_frame, with_patch, RecordedImage, RecordingSink, VecSource};
use motion_centroid::*;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

const PATCH_ORIGIN: (u32, u32) = (20, 12);
const PATCH_SIZE: (u32, u32) = (16, 12);

fn background() -> RgbImage {
    uniform_frame(WIDTH, HEIGHT, [30, 30, 30])
}

fn moved() -> RgbImage {
    with_patch(&background(), PATCH_ORIGIN, PATCH_SIZE, [220, 220, 220])
}

fn noise_frame(rng: &mut StdRng) -> RgbImage {
    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    rng.fill(&mut buf[..]);
    RgbImage::from_raw(WIDTH, HEIGHT, buf).unwrap()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn test_identical_frames_have_no_motion() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let frame = noise_frame(&mut rng);

    let report = process_frame_pair(&frame, &frame, &PipelineOptions::default()).unwrap();

    assert_close(report.score, 1.0);
    assert!(report.regions.is_empty());
    assert_eq!(report.motion, Motion::NoMotion);
    assert_eq!(report.change_mask.foreground_count(), 0);

    //nothing is drawn when there is no motion.
    assert_eq!(report.annotated, frame);
}

#[test]
fn test_single_patch() {
    let report = process_frame_pair(&background(), &moved(), &PipelineOptions::default()).unwrap();

    assert!(report.score < 1.0);
    assert_eq!(report.regions.len(), 1);

    //the box may grow by up to half a window on each side of the patch.
    let radius = DEFAULT_SSIM_WINDOW_SIZE / 2;
    let region = report.regions[0];
    let (px, py) = PATCH_ORIGIN;
    let (pw, ph) = PATCH_SIZE;

    assert!(region.x <= px && px - region.x <= radius);
    assert!(region.y <= py && py - region.y <= radius);
    assert!(region.right() >= px + pw && region.right() - (px + pw) <= radius);
    assert!(region.bottom() >= py + ph && region.bottom() - (py + ph) <= radius);

    let centroid = report.motion.centroid().unwrap();
    assert_close(centroid.x, f64::from(px) + f64::from(pw) / 2.0);
    assert_close(centroid.y, f64::from(py) + f64::from(ph) / 2.0);

    assert_ne!(report.annotated, moved());
}

#[test]
fn test_centroid_independent_of_region_order() {
    let regions = vec![
        Region::new(0, 0, 10, 10),
        Region::new(500, 20, 100, 10),
        Region::new(40, 300, 3, 70),
        Region::new(250, 250, 25, 25),
    ];

    let expected = motion_centroid(&regions).centroid().unwrap();

    for perm in regions.iter().copied().permutations(regions.len()) {
        let got = motion_centroid(&perm).centroid().unwrap();
        assert!((got.x - expected.x).abs() < 1e-6);
        assert!((got.y - expected.y).abs() < 1e-6);
    }

    let mut rng = StdRng::seed_from_u64(1);
    let mut many: Vec<Region> = (0..50)
        .map(|i| Region::new(i * 7, i * 3, i % 9 + 1, i % 5 + 1))
        .collect();
    let expected = motion_centroid(&many).centroid().unwrap();
    for _ in 0..10 {
        many.shuffle(&mut rng);
        let got = motion_centroid(&many).centroid().unwrap();
        assert!((got.x - expected.x).abs() < 1e-6);
        assert!((got.y - expected.y).abs() < 1e-6);
    }
}

#[test]
fn test_dimension_mismatch_keeps_previous_frame() {
    let mut controller = FramePairController::new(PipelineOptions::default()).unwrap();
    controller.push_frame(background()).unwrap();

    let res = controller.push_frame(uniform_frame(WIDTH / 2, HEIGHT, [30, 30, 30]));
    assert!(matches!(
        res,
        Err(InvalidInput::DimensionMismatch {
            expected: (WIDTH, HEIGHT),
            actual: (32, HEIGHT)
        })
    ));

    //the stored frame is still the background, so pushing it again shows no change.
    let report = controller.push_frame(background()).unwrap().unwrap();
    assert_close(report.score, 1.0);
    assert_eq!(report.motion, Motion::NoMotion);
}

#[test]
fn test_run_until_end_of_stream() {
    let source = VecSource::new([background(), moved(), moved()]);
    let dropped = source.dropped();
    let mut sink = RecordingSink::new();

    let mut centroids = vec![];
    let summary = run(
        source,
        &mut sink,
        &mut NeverStop,
        PipelineOptions::default(),
        |idx, report| centroids.push((idx, report.motion)),
    )
    .unwrap();

    assert!(dropped.get());
    assert_eq!(
        summary,
        RunSummary {
            frames_read: 3,
            pairs_processed: 2,
            pairs_with_motion: 1,
            stop_reason: StopReason::EndOfStream,
        }
    );

    assert_eq!(centroids.len(), 2);
    assert_eq!(centroids[0].0, 0);
    assert!(centroids[0].1.is_detected());
    assert_eq!(centroids[1], (1, Motion::NoMotion));

    let expected_labels = [LABEL_DIFFERENCE, LABEL_THRESH, LABEL_ANNOTATED].repeat(2);
    assert_eq!(sink.labels(), expected_labels);

    for (label, image) in sink.shown() {
        match image {
            RecordedImage::Gray(img) => {
                assert_ne!(label, LABEL_ANNOTATED);
                assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
            }
            RecordedImage::Color(img) => {
                assert_eq!(label, LABEL_ANNOTATED);
                assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
            }
        }
    }
}

#[test]
fn test_run_stops_when_requested() {
    let source = VecSource::new([background(), moved(), background(), moved()]);
    let dropped = source.dropped();
    let mut sink = RecordingSink::new();

    let mut polls = 0;
    let mut stop = || {
        polls += 1;
        polls >= 2
    };

    let summary = run(source, &mut sink, &mut stop, PipelineOptions::default(), |_, _| ()).unwrap();

    assert!(dropped.get());
    assert_eq!(summary.stop_reason, StopReason::StopRequested);
    assert_eq!(summary.frames_read, 2);
    assert_eq!(summary.pairs_processed, 1);
    assert_eq!(sink.labels().len(), 3);
}

#[test]
fn test_source_error_is_propagated() {
    let source = VecSource::new([background(), moved(), moved()]).failing_after(2);
    let dropped = source.dropped();

    let res = run(
        source,
        &mut NullSink,
        &mut NeverStop,
        PipelineOptions::default(),
        |_, _| (),
    );

    assert!(dropped.get());
    assert!(matches!(res, Err(Error::FrameSource(_))));
}

#[test]
fn test_mismatched_frame_ends_run() {
    let source = VecSource::new([background(), uniform_frame(10, 10, [0, 0, 0])]);
    let dropped = source.dropped();
    let mut sink = RecordingSink::new();

    let res = run(
        source,
        &mut sink,
        &mut NeverStop,
        PipelineOptions::default(),
        |_, _| (),
    );

    assert!(dropped.get());
    assert!(res.unwrap_err().is_invalid_input());
    assert!(sink.labels().is_empty());
}

#[test]
fn test_invalid_options_rejected_before_reading() {
    let source = VecSource::new([background(), moved()]);
    let dropped = source.dropped();
    let opts = PipelineOptions {
        window_size: 4,
        ..PipelineOptions::default()
    };

    let res = run(source, &mut NullSink, &mut NeverStop, opts, |_, _| ());

    assert!(dropped.get());
    assert!(matches!(
        res,
        Err(Error::InvalidInput(InvalidInput::InvalidWindowSize(4)))
    ));
}
