//! Edge case and error handling tests for backdrop-cutout
//!
//! Degenerate inputs must come back unchanged, malformed options must be
//! reported.

use backdrop_cutout::{
    ApplyBackgroundMask, Decode, DecodeError, ImageDecoder, InterAreaResize, Mode, Options,
    OptionsError, RemoveBackground, ResizeError, Seed, SegmentError, Segmenter,
};
use image::{ImageBuffer, Luma, Rgba, RgbaImage};

/// Deterministic per-pixel noise
fn noise_image(width: u32, height: u32) -> RgbaImage {
    let hash = |index: u32| {
        let mut x = index.wrapping_mul(2_654_435_761);
        x ^= x >> 13;
        x = x.wrapping_mul(0x5bd1_e995);
        ((x ^ (x >> 15)) & 0xff) as u8
    };
    RgbaImage::from_fn(width, height, |x, y| {
        let i = (y * width + x) * 3;
        Rgba([hash(i), hash(i + 1), hash(i + 2), 255])
    })
}

fn default_segmenter() -> Segmenter {
    Segmenter::new(Options::default()).unwrap()
}

#[test]
fn single_pixel_image_is_returned_unchanged() {
    let image = RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 78]));

    let output = default_segmenter().segment(image.clone());

    assert_eq!(output.as_raw(), image.as_raw());
}

#[test]
fn single_pixel_image_reports_too_small() {
    let image = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
    let failure = default_segmenter().try_segment(image.clone()).unwrap_err();

    assert_eq!(
        failure.error(),
        &SegmentError::ImageTooSmall { width: 1, height: 1 }
    );
    assert_eq!(failure.into_image(), image);
}

#[test]
fn single_row_and_column_images_are_segmented() {
    for (width, height) in [(2, 1), (9, 1), (1, 9), (300, 1)] {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]));

        let output = default_segmenter().segment(image);

        assert_eq!(output.dimensions(), (width, height));
        assert!(output.pixels().all(|p| *p == Rgba([200, 200, 200, 0])));
    }
}

#[test]
fn thin_image_downscaled_to_one_row_is_segmented() {
    let image = RgbaImage::from_pixel(2000, 3, Rgba([60, 120, 180, 255]));

    let output = default_segmenter().segment(image);

    assert_eq!(output.dimensions(), (512, 1));
    assert!(output.pixels().all(|p| p[3] == 0));
}

#[test]
fn empty_image_is_returned_unchanged() {
    let output = default_segmenter().segment(RgbaImage::new(0, 0));
    assert_eq!(output.dimensions(), (0, 0));
}

#[test]
fn noise_without_seeds_is_returned_unchanged() {
    for size in [16, 24, 32] {
        let image = noise_image(size, size);
        let failure = default_segmenter().try_segment(image.clone()).unwrap_err();

        assert_eq!(failure.error(), &SegmentError::NoBackgroundEstimate);
        assert_eq!(failure.into_image(), image);
    }
}

#[test]
fn seed_mode_without_seeds_is_returned_unchanged() {
    let image = RgbaImage::from_pixel(20, 20, Rgba([90, 90, 90, 255]));
    let segmenter = Segmenter::new(Options::default().with_mode(Mode::Seed)).unwrap();

    assert_eq!(segmenter.segment(image.clone()), image);
}

#[test]
fn seeds_outside_image_are_ignored() {
    let image = RgbaImage::from_pixel(20, 20, Rgba([90, 90, 90, 255]));
    let options = Options::default()
        .with_mode(Mode::Seed)
        .with_seeds([Seed::forced(20, 0), Seed::new(0, 400)]);

    let output = Segmenter::new(options).unwrap().segment(image.clone());

    assert_eq!(output, image);
}

#[test]
fn transparent_input_alpha_is_overwritten() {
    let image = RgbaImage::from_pixel(10, 10, Rgba([5, 5, 5, 17]));
    let output = default_segmenter().segment(image);
    assert!(output.pixels().all(|p| *p == Rgba([5, 5, 5, 0])));
}

#[test]
fn invalid_options_are_rejected() {
    let cases = [
        (
            Options::default().with_color_tol(-1.0),
            OptionsError::InvalidColorTolerance(-1.0),
        ),
        (
            Options::default().with_color_tol(f32::INFINITY),
            OptionsError::InvalidColorTolerance(f32::INFINITY),
        ),
        (
            Options::default().with_grad_keep(f32::NEG_INFINITY),
            OptionsError::InvalidEdgeThreshold(f32::NEG_INFINITY),
        ),
        (
            Options::default().with_max_dimension(0),
            OptionsError::ZeroMaxDimension,
        ),
    ];

    for (options, expected) in cases {
        assert_eq!(Segmenter::new(options.clone()).unwrap_err(), expected);
        let image = RgbaImage::new(4, 4);
        assert_eq!(image.remove_background(&options).unwrap_err(), expected);
    }
}

#[test]
fn nan_color_tolerance_is_rejected() {
    let result = Segmenter::new(Options::default().with_color_tol(f32::NAN));
    assert!(matches!(
        result,
        Err(OptionsError::InvalidColorTolerance(value)) if value.is_nan()
    ));
}

#[test]
fn zero_color_tolerance_is_accepted() {
    let image = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
    let segmenter = Segmenter::new(Options::default().with_color_tol(0.0)).unwrap();

    // The tolerance floor still admits the uniform backdrop
    assert!(segmenter.segment(image).pixels().all(|p| p[3] == 0));
}

#[test]
fn mode_strings_parse_and_display() {
    for mode in [Mode::Auto, Mode::Seed, Mode::AutoAndSeed] {
        assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
    }
    assert_eq!(" auto+seed ".parse::<Mode>(), Ok(Mode::AutoAndSeed));
    assert_eq!(
        "manual".parse::<Mode>(),
        Err(OptionsError::UnknownMode("manual".to_string()))
    );
}

#[test]
fn decoder_rejects_empty_and_unknown_bytes() {
    assert!(matches!(ImageDecoder.decode(&[]), Err(DecodeError::Empty)));
    assert!(matches!(
        ImageDecoder.decode(&[0x13, 0x37, 0x00, 0x42]),
        Err(DecodeError::Image(_))
    ));
}

#[test]
fn resize_rejects_upscaling() {
    let image = RgbaImage::new(4, 4);
    let result = InterAreaResize::new(8, 8).unwrap().resize(&image);

    assert_eq!(
        result.unwrap_err(),
        ResizeError::UpscalingNotSupported {
            src_width: 4,
            src_height: 4,
            target_width: 8,
            target_height: 8,
        }
    );
}

#[test]
fn apply_background_mask_rejects_mismatched_mask() {
    let image = RgbaImage::new(4, 4);
    let mask: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::new(4, 3);
    assert!(image.apply_background_mask(&mask).is_err());
}

#[test]
fn apply_background_mask_clamps_out_of_range_values() {
    let image = RgbaImage::from_pixel(3, 1, Rgba([9, 9, 9, 9]));
    let mask = ImageBuffer::from_raw(3, 1, vec![-0.5f32, 1.5, 0.5]).unwrap();

    let output = image.apply_background_mask(&mask).unwrap();

    assert_eq!(output.get_pixel(0, 0)[3], 255);
    assert_eq!(output.get_pixel(1, 0)[3], 0);
    assert_eq!(output.get_pixel(2, 0)[3], 128);
}

#[cfg(feature = "serde")]
#[test]
fn json_options_are_parsed_and_validated() {
    let options = Options::from_json_str(
        r#"{
            "colorTol": 14,
            "tileGuess": 8,
            "gradKeep": 20,
            "feather": 0,
            "seedPoints": [{ "x": 3, "y": 4, "force": true }, { "x": 1, "y": 1 }],
            "mode": "seed",
            "maxDimension": 256
        }"#,
    )
    .unwrap();

    assert_eq!(options.color_tol, 14.0);
    assert_eq!(options.tile_guess, 8);
    assert_eq!(options.mode, Mode::Seed);
    assert_eq!(options.seed_points, vec![Seed::forced(3, 4), Seed::new(1, 1)]);
    assert_eq!(options.max_dimension, 256);

    assert_eq!(
        Options::from_json_str(r#"{ "maxDimension": 0 }"#),
        Err(OptionsError::ZeroMaxDimension)
    );
    assert!(matches!(
        Options::from_json_str(r#"{ "mode": "everything" }"#),
        Err(OptionsError::Parse(_))
    ));
}
