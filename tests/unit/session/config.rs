use super::*;

#[test]
fn defaults_match_the_documented_parameters() {
    let c = TransitionConfig::default();
    assert_eq!((c.width, c.height), (1280, 720));
    assert_eq!(c.duration_ms, 2500.0);
    assert_eq!(c.raven_count, 180);
    assert_eq!(c.seed, None);
    assert_eq!(c.mask_blur_sigma, 0.8);
    assert_eq!(c.ease, Ease::InOutCubic);
    assert_eq!(c.capture.sample_fps, 60);
    assert_eq!(c.capture.encoder, EncoderKind::FfmpegWebm);
    assert!(c.validate().is_ok());
}

#[test]
fn partial_json_fills_in_defaults() {
    let c = TransitionConfig::from_json_str(
        r#"{"width": 640, "height": 360, "seed": 7, "capture": {"encoder": "raw"}}"#,
    )
    .unwrap();
    assert_eq!(c.canvas(), Canvas::new(640, 360).unwrap());
    assert_eq!(c.seed, Some(7));
    assert_eq!(c.duration_ms, DEFAULT_DURATION_MS);
    assert_eq!(c.capture.encoder, EncoderKind::Raw);
    assert_eq!(c.capture.sample_fps, 60);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = TransitionConfig::from_json_str(r#"{"ravens": 3}"#).unwrap_err();
    assert!(matches!(err, RavenError::Serde(_)));
    let err = TransitionConfig::from_json_str(r#"{"capture": {"fps": 30}}"#).unwrap_err();
    assert!(matches!(err, RavenError::Serde(_)));
}

#[test]
fn validation_catches_bad_values() {
    let bad = [
        TransitionConfig {
            width: 0,
            ..TransitionConfig::default()
        },
        TransitionConfig {
            duration_ms: 0.0,
            ..TransitionConfig::default()
        },
        TransitionConfig {
            duration_ms: f64::NAN,
            ..TransitionConfig::default()
        },
        TransitionConfig {
            raven_count: crate::flock::generator::MAX_RAVEN_COUNT + 1,
            ..TransitionConfig::default()
        },
        TransitionConfig {
            width: 16_384,
            height: 16_384,
            ..TransitionConfig::default()
        },
        TransitionConfig {
            mask_blur_sigma: -1.0,
            ..TransitionConfig::default()
        },
        TransitionConfig {
            capture: CaptureConfig {
                sample_fps: 0,
                ..CaptureConfig::default()
            },
            ..TransitionConfig::default()
        },
        TransitionConfig {
            capture: CaptureConfig {
                crf: 64,
                ..CaptureConfig::default()
            },
            ..TransitionConfig::default()
        },
    ];
    for c in bad {
        assert!(
            matches!(c.validate(), Err(RavenError::Validation(_))),
            "{c:?}"
        );
    }
}

#[test]
fn impractical_durations_are_still_accepted() {
    let c = TransitionConfig {
        duration_ms: 100.0,
        ..TransitionConfig::default()
    };
    assert!(c.validate().is_ok());
}

#[test]
fn loads_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raven.json");
    std::fs::write(&path, r#"{"duration_ms": 1200, "ease": "linear"}"#).unwrap();
    let c = TransitionConfig::from_path(&path).unwrap();
    assert_eq!(c.duration_ms, 1200.0);
    assert_eq!(c.ease, Ease::Linear);
    assert!(TransitionConfig::from_path(dir.path().join("missing.json")).is_err());
}

#[test]
fn capture_config_drives_ffmpeg_opts() {
    let cap = CaptureConfig {
        background_rgba: [255, 255, 255, 255],
        crf: 20,
        ..CaptureConfig::default()
    };
    assert_eq!(
        cap.ffmpeg_opts(),
        FfmpegWebmOpts {
            bg_rgba: [255, 255, 255, 255],
            crf: 20,
        }
    );
    assert_eq!(cap.create_encoder().media_type(), "video/webm");
}
