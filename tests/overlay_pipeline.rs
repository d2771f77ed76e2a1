//! End-to-end tests: recorded landmarks through config, pipeline and targets.

use face_overlay::{
    build_fan, AnyTarget, CanvasOrigin, Color, Contour, CoordinateMapper, Error, FrameOutcome,
    FramePipeline, FrameSize, Landmark, LandmarkSet, MappingPolicy, MeshTarget, MirrorFlip,
    MissPolicy, NormalizeCenter, OverlayBuilder, OverlayConfig, OverlayStyle, Point, Recording,
    RenderBackend, ReplayDetector, FACE_MESH_LANDMARKS, OUTER_LIPS,
};

const VGA: FrameSize = FrameSize::new(640.0, 480.0);

/// A synthetic face mesh: every landmark on a loose grid, with the outer lip
/// contour placed on an ellipse around (320, 360).
fn synthetic_face(offset_x: f32) -> LandmarkSet {
    let mut points: Vec<Landmark> = (0..FACE_MESH_LANDMARKS)
        .map(|i| Landmark::new((i % 26) as f32 * 24.0, (i / 26) as f32 * 26.0, 0.0))
        .collect();

    let n = OUTER_LIPS.len();
    for (k, &idx) in OUTER_LIPS.iter().enumerate() {
        let t = k as f32 / n as f32 * std::f32::consts::TAU;
        points[idx] = Landmark::new(320.0 + offset_x + 60.0 * t.cos(), 360.0 + 25.0 * t.sin(), -4.0);
    }
    LandmarkSet::new(points)
}

fn recording(frames: Vec<LandmarkSet>) -> Recording {
    Recording {
        width: 640.0,
        height: 480.0,
        frames,
    }
}

#[test]
fn square_scenario() {
    let ring = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ];
    let fan = build_fan(&ring).unwrap();

    assert_eq!(
        fan.vertices,
        vec![ring[0], ring[1], ring[2], ring[3], Point::new(5.0, 5.0)]
    );
    assert_eq!(fan.indices, vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4]);
}

#[test]
fn mapping_scenarios() {
    assert_eq!(
        MirrorFlip.map(Point::new(100.0, 50.0), VGA),
        Point::new(540.0, 430.0)
    );

    let centre = NormalizeCenter::new(4.0, 3.0).map(Point::new(320.0, 240.0), VGA);
    assert!(centre.x.abs() < 1e-6 && centre.y.abs() < 1e-6);
}

#[test]
fn one_index_contour_rejected_at_startup() {
    let err = Contour::new(vec![61], FACE_MESH_LANDMARKS).unwrap_err();
    assert!(matches!(err, Error::InvalidContour { .. }));
}

#[test]
fn mirrored_lips_follow_the_face() {
    let builder = OverlayBuilder::new(
        Contour::new(OUTER_LIPS.to_vec(), FACE_MESH_LANDMARKS).unwrap(),
        MappingPolicy::MirrorFlip,
    );

    let fan = builder.build(&synthetic_face(0.0), VGA).unwrap();
    let c = fan.centroid().unwrap();
    // Centroid (320, 360) mirrored and flipped.
    assert!((c.x - 320.0).abs() < 1e-3);
    assert!((c.y - 120.0).abs() < 1e-3);

    // Moving the face right moves the mirrored overlay left.
    let moved = builder.build(&synthetic_face(40.0), VGA).unwrap();
    assert!((moved.centroid().unwrap().x - 280.0).abs() < 1e-3);

    let ellipse_area = std::f32::consts::PI * 60.0 * 25.0;
    assert!(fan.area() > ellipse_area * 0.9 && fan.area() < ellipse_area);
}

#[test]
fn replayed_session_on_mesh_target() {
    let detector = ReplayDetector::new(recording(vec![
        synthetic_face(0.0),
        LandmarkSet::default(),
        synthetic_face(10.0),
        LandmarkSet::default(),
    ]));
    let frames: Vec<_> = detector.frames().collect();
    let builder = OverlayBuilder::new(
        Contour::new(OUTER_LIPS.to_vec(), FACE_MESH_LANDMARKS).unwrap(),
        NormalizeCenter::new(4.0, 3.0),
    );

    let mut pipeline = FramePipeline::new(detector, MeshTarget::new(), builder);
    let mut outcomes = Vec::new();
    let stats = pipeline
        .run_with(
            frames,
            |_| OverlayStyle::default(),
            |report, _| {
                outcomes.push(report.outcome);
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            FrameOutcome::Updated,
            FrameOutcome::Stale,
            FrameOutcome::Updated,
            FrameOutcome::Stale
        ]
    );
    assert_eq!(stats.frames, 4);

    let mesh = pipeline.target();
    assert!(mesh.is_visible());
    assert_eq!(mesh.version(), 2);
    assert_eq!(mesh.positions().len(), (OUTER_LIPS.len() + 1) * 3);
    assert_eq!(mesh.indices().len(), OUTER_LIPS.len() * 3);
    // Normalised plane is 4 units wide and 3 tall.
    assert!(mesh.positions().iter().step_by(3).all(|x| x.abs() <= 2.0));
    assert!(mesh.positions().iter().skip(1).step_by(3).all(|y| y.abs() <= 1.5));
}

#[test]
fn configured_canvas_session_paints_lips() {
    let config = OverlayConfig::from_json(
        r##"{
            "mapping": {"kind": "identity"},
            "backend": "canvas",
            "miss_policy": "hide",
            "color": "#ff0000",
            "opacity": 1.0
        }"##,
    )
    .unwrap();

    let detector = ReplayDetector::new(recording(vec![synthetic_face(0.0), LandmarkSet::default()]));
    let frames: Vec<_> = detector.frames().collect();
    let target = AnyTarget::for_backend(config.backend, VGA, CanvasOrigin::TopLeft);
    let mut pipeline = FramePipeline::new(detector, target, config.build_overlay().unwrap())
        .with_miss_policy(config.miss_policy);

    let style = config.style();
    let mut painted = Vec::new();
    pipeline
        .run_with(
            frames,
            |_| style,
            |_, target| {
                let canvas = target.as_canvas().unwrap();
                painted.push((
                    *canvas.image().get_pixel(320, 360),
                    *canvas.image().get_pixel(100, 100),
                ));
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(painted[0].0 .0, [255, 0, 0, 255]);
    assert_eq!(painted[0].1 .0, [0, 0, 0, 0]);
    // Hidden on the miss.
    assert_eq!(painted[1].0 .0, [0, 0, 0, 0]);
}

#[test]
fn keep_stale_repaints_with_new_colour() {
    let config = OverlayConfig {
        mapping: MappingPolicy::Identity,
        backend: RenderBackend::Canvas,
        miss_policy: MissPolicy::KeepStale,
        opacity: 1.0,
        ..OverlayConfig::default()
    };
    let detector = ReplayDetector::new(recording(vec![synthetic_face(0.0), LandmarkSet::default()]));
    let frames: Vec<_> = detector.frames().collect();
    let target = AnyTarget::for_backend(config.backend, VGA, config.effective_canvas_origin());
    let mut pipeline = FramePipeline::new(detector, target, config.build_overlay().unwrap());

    let colors = [Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)];
    let mut centre = Vec::new();
    pipeline
        .run_with(
            frames,
            |i| config.style().with_color(colors[i as usize]),
            |_, target| {
                centre.push(*target.as_canvas().unwrap().image().get_pixel(320, 360));
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(centre[0].0, [255, 0, 0, 255]);
    assert_eq!(centre[1].0, [0, 0, 255, 255]);
}

#[test]
fn default_mapping_on_canvas_paints_the_mouth_row() {
    let config = OverlayConfig {
        backend: RenderBackend::Canvas,
        ..OverlayConfig::default()
    };
    config.validate().unwrap();

    let detector = ReplayDetector::new(recording(vec![synthetic_face(0.0)]));
    let frames: Vec<_> = detector.frames().collect();
    let target = AnyTarget::for_backend(config.backend, VGA, config.effective_canvas_origin());
    let mut pipeline = FramePipeline::new(detector, target, config.build_overlay().unwrap());
    pipeline.run(frames, &config.style()).unwrap();

    let image = pipeline.target().as_canvas().unwrap().image();
    // Lips sit at (320, 360) in the camera frame; the mirrored, flipped
    // geometry must land back on that row, not on row 120.
    assert!(image.get_pixel(320, 360)[3] > 0);
    assert_eq!(image.get_pixel(320, 120)[3], 0);
}
