use facebox::detection::{detections_from_tensors, read_detections_json, Detection};
use facebox::geometry::BBox;
use facebox::label_map::{convert_label_map_to_categories, create_category_index, CategoryId};
use facebox::visualize::{
    encode_image_as_png, BoxAnnotator, Color, DrawOptions, LabelFont, VisualizeOptions,
};
use facebox::FaceboxError;
use image::Rgb;
use ndarray::{array, Array1, Array2};

mod common;

fn annotator() -> BoxAnnotator {
    BoxAnnotator::with_font(LabelFont::builtin())
}

#[test]
fn empty_box_array_leaves_image_untouched() {
    let mut image = common::blank_image(64, 48);
    let before = image.clone();
    let boxes = Array2::<f32>::zeros((0, 4));

    annotator()
        .draw_bounding_boxes_on_image(&mut image, &boxes, &DrawOptions::default(), None)
        .expect("draw nothing");
    assert_eq!(image, before);
}

#[test]
fn three_boxes_are_drawn() {
    let mut image = common::blank_image(120, 120);
    let boxes = array![
        [0.1f32, 0.1, 0.3, 0.3],
        [0.4, 0.4, 0.6, 0.6],
        [0.7, 0.7, 0.9, 0.9]
    ];

    annotator()
        .draw_bounding_boxes_on_image(&mut image, &boxes, &DrawOptions::default(), None)
        .expect("draw three boxes");

    let red = Rgb([255, 0, 0]);
    for (x, y) in [(12, 12), (48, 48), (84, 84)] {
        assert_eq!(*image.get_pixel(x, y), red, "corner ({x}, {y})");
    }
}

#[test]
fn wrong_column_count_fails_without_drawing() {
    let mut image = common::blank_image(32, 32);
    let before = image.clone();
    let boxes = Array2::<f32>::from_elem((3, 5), 0.5);

    let err = annotator()
        .draw_bounding_boxes_on_image(&mut image, &boxes, &DrawOptions::default(), None)
        .unwrap_err();
    match err {
        FaceboxError::InvalidShape { shape, .. } => assert_eq!(shape, vec![3, 5]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(image, before);
}

#[test]
fn one_dimensional_array_is_rejected() {
    let mut image = common::blank_image(32, 32);
    let boxes = Array1::<f32>::from_vec(vec![0.1, 0.1, 0.5, 0.5]);

    let err = annotator()
        .draw_bounding_boxes_on_image(&mut image, &boxes, &DrawOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, FaceboxError::InvalidShape { .. }));
}

#[test]
fn single_box_reaches_expected_corners() {
    let mut image = common::blank_image(100, 100);
    let options = DrawOptions {
        color: Color::named("Chartreuse").expect("palette color"),
        ..DrawOptions::default()
    };

    annotator().draw_bounding_box_on_image(
        &mut image,
        0.1,
        0.2,
        0.5,
        0.6,
        &options,
        &[] as &[&str],
    );

    let chartreuse = Rgb([127, 255, 0]);
    assert_eq!(*image.get_pixel(20, 10), chartreuse);
    assert_eq!(*image.get_pixel(60, 50), chartreuse);
    assert_eq!(*image.get_pixel(40, 30), common::BACKGROUND);
}

#[test]
fn labels_are_painted_above_the_box() {
    let mut plain = common::blank_image(100, 100);
    let mut labelled = common::blank_image(100, 100);
    let options = DrawOptions::default();

    annotator().draw_bounding_box_on_image(
        &mut plain,
        0.5,
        0.1,
        0.9,
        0.9,
        &options,
        &[] as &[&str],
    );
    annotator().draw_bounding_box_on_image(
        &mut labelled,
        0.5,
        0.1,
        0.9,
        0.9,
        &options,
        &["face: 97%"],
    );

    let above_box = |img: &image::RgbImage| {
        (0..40)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) != common::BACKGROUND)
            .count()
    };
    assert_eq!(above_box(&plain), 0);
    assert!(above_box(&labelled) > 0);
}

#[test]
fn detections_file_renders_above_threshold_only() {
    let detections = read_detections_json(std::path::Path::new("tests/fixtures/detections.json"))
        .expect("read detections");
    assert_eq!(detections.len(), 3);

    let index = create_category_index(&convert_label_map_to_categories(None, 2, true));
    let mut image = common::blank_image(160, 120);
    let drawn = annotator().visualize_detections(
        &mut image,
        &detections,
        &index,
        &VisualizeOptions::default(),
    );

    assert_eq!(drawn, 2);
    assert!(common::painted_pixels(&image) > 0);
    // The low-score full-frame box would paint the bottom-right corner.
    assert_eq!(*image.get_pixel(159, 119), common::BACKGROUND);
}

#[test]
fn tensor_output_feeds_visualization() {
    let boxes = ndarray::Array3::from_shape_vec(
        (1, 2, 4),
        vec![0.1f32, 0.1, 0.4, 0.4, 0.5, 0.5, 0.8, 0.8],
    )
    .expect("boxes");
    let scores = array![[0.9f32, 0.3]];
    let classes = array![[1.0f32, 1.0]];

    let detections: Vec<Detection> =
        detections_from_tensors(&boxes, &scores, &classes, 2).expect("detections");
    assert_eq!(
        detections[0],
        Detection::new(
            BBox::from_yxyx(0.1f32.into(), 0.1f32.into(), 0.4f32.into(), 0.4f32.into()),
            0.9,
            CategoryId(1)
        )
    );

    let index = create_category_index(&convert_label_map_to_categories(None, 1, true));
    let mut image = common::blank_image(50, 50);
    let drawn = annotator().visualize_detections(
        &mut image,
        &detections,
        &index,
        &VisualizeOptions::default(),
    );
    assert_eq!(drawn, 1);

    let png = encode_image_as_png(&image).expect("encode");
    let decoded = image::load_from_memory(&png).expect("decode").to_rgb8();
    assert_eq!(decoded, image);
}

#[test]
fn unreadable_frame_maps_to_image_error() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let frame_path = temp.path().join("missing_frame.jpg");

    let result = image::open(&frame_path).map_err(|source| FaceboxError::Image {
        path: frame_path.clone(),
        source,
    });

    let err = result.expect_err("missing frame should fail");
    assert!(matches!(&err, FaceboxError::Image { path, .. } if *path == frame_path));
    assert!(err.to_string().contains("missing_frame.jpg"));
}
