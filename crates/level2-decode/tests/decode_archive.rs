//! End-to-end decoding of synthetic archive records.

use level2_common::{Moment, NO_DATA};
use level2_decode::{decode_record, decode_record_with_options, AssemblerOptions, DecodeError};
use test_utils::{
    expected_value, MomentFixture, SweepFixture, VolumeFixture, TEST_BASE_MS, TEST_NYQUIST,
    TEST_VCP,
};

#[test]
fn decodes_multi_sweep_volume() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.5, 0.9], 6, 32);
    let volume = decode_record(&fixture.archive_bytes()).expect("decode");

    assert_eq!(volume.site.as_deref(), Some("KDMX"));
    assert_eq!(volume.coverage_pattern, Some(TEST_VCP));

    for moment in [Moment::Reflectivity, Moment::Velocity] {
        let sweeps = volume.sweeps(&moment);
        assert_eq!(sweeps.len(), 3, "{moment} sweep count");
        let elevations: Vec<f32> = sweeps.iter().map(|s| s.elevation).collect();
        assert_eq!(elevations, vec![0.5, 0.5, 0.9]);

        for sweep in sweeps {
            assert_eq!(sweep.az_count, 6);
            assert_eq!(sweep.range_count, 32);
            assert!((sweep.range_first - 2.125).abs() < 1e-6);
            assert!((sweep.range_step - 0.25).abs() < 1e-6);
            assert!((sweep.az_step - 1.0).abs() < 1e-6);
            assert_eq!(sweep.nyquist_velocity, Some(TEST_NYQUIST));
            assert!(sweep.start_time.is_some());
            assert!(sweep.end_time.unwrap() > sweep.start_time.unwrap());
        }
    }
}

#[test]
fn sample_values_decode_exactly() {
    let fixture = VolumeFixture::two_moment(&[1.5], 4, 16);
    let volume = decode_record(&fixture.archive_bytes()).expect("decode");

    let sweep = &volume.sweeps(&Moment::Reflectivity)[0];
    for azimuth in 0..4usize {
        for gate in 0..16usize {
            let expected = expected_value((azimuth + 1) as u16, gate, 2.0, 66.0);
            assert_eq!(sweep.value(azimuth, gate), Some(expected));
        }
    }

    let velocity = &volume.sweeps(&Moment::Velocity)[0];
    let expected = expected_value(1, 0, 2.0, 129.0);
    assert_eq!(velocity.value(0, 0), Some(expected));
}

#[test]
fn seventeen_sweep_volume_keeps_transmission_order() {
    // A VCP 212-style elevation sequence with split cuts: low angles
    // revisited, so sorting by angle would reorder it.
    let elevations = [
        0.5, 0.5, 0.9, 0.9, 1.3, 1.3, 1.8, 2.4, 3.1, 4.0, 5.1, 6.4, 8.0, 10.0, 12.5, 15.6, 19.5,
    ];
    let fixture = VolumeFixture::two_moment(&elevations, 4, 8);
    let volume = decode_record(&fixture.archive_bytes()).expect("decode");

    for moment in [Moment::Reflectivity, Moment::Velocity] {
        let sweeps = volume.sweeps(&moment);
        assert_eq!(sweeps.len(), 17);
        let decoded: Vec<f32> = sweeps.iter().map(|s| s.elevation).collect();
        assert_eq!(decoded, elevations.to_vec());
    }
}

#[test]
fn decoding_is_idempotent() {
    let fixture = VolumeFixture::two_moment(&[0.5, 1.5], 6, 24);
    let bytes = fixture.archive_bytes();
    let first = decode_record(&bytes).expect("first decode");
    let second = decode_record(&bytes).expect("second decode");
    assert!(first.equivalent(&second));
}

#[test]
fn segment_boundary_inside_message_body() {
    let fixture = VolumeFixture::two_moment(&[0.5], 4, 16);
    let stream = fixture.message_stream();
    // All four radial messages are identical in size.
    let message_len = stream.len() / 4;

    // Three segments; the middle compressed block spans the tail of the
    // first message and most of the second message's body.
    let cuts = [message_len - 8, message_len + message_len / 2];
    let split = decode_record(&fixture.archive_bytes_split(&cuts)).expect("split decode");
    let whole = decode_record(&fixture.archive_bytes()).expect("whole decode");

    assert!(split.equivalent(&whole));
}

#[test]
fn truncated_stream_reports_offset() {
    let fixture = VolumeFixture::two_moment(&[0.5], 4, 16);
    let stream = fixture.message_stream();

    let mut bytes = fixture.volume_header();
    bytes.extend(test_utils::ldm_record(&stream[..stream.len() - 10], true));

    let err = decode_record(&bytes).expect_err("must fail");
    match err {
        DecodeError::TruncatedMessage { message, .. } => assert_eq!(message, 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_moments_are_preserved_by_default() {
    let fixture = VolumeFixture::new(vec![SweepFixture::new(
        0.5,
        4,
        8,
        vec![MomentFixture::reflectivity(), MomentFixture::named("XYZ")],
    )]);
    let volume = decode_record(&fixture.archive_bytes()).expect("decode");

    let unknown = Moment::Other("XYZ".to_string());
    assert_eq!(volume.sweeps(&unknown).len(), 1);
    assert_eq!(volume.sweeps(&unknown)[0].az_count, 4);
}

#[test]
fn strict_mode_rejects_unknown_moments() {
    let fixture = VolumeFixture::new(vec![SweepFixture::new(
        0.5,
        4,
        8,
        vec![MomentFixture::named("XYZ")],
    )]);
    let options = AssemblerOptions {
        strict_moments: true,
        ..Default::default()
    };
    let err = decode_record_with_options(&fixture.archive_bytes(), options).expect_err("strict");
    assert!(matches!(err, DecodeError::UnknownMoment { name, .. } if name == "XYZ"));
}

#[test]
fn duplicate_radials_are_appended_once() {
    let fixture = VolumeFixture::two_moment(&[0.5], 4, 16);
    let stream = fixture.message_stream();
    let message_len = stream.len() / 4;

    // Retransmit the second radial, as the live feed sometimes does.
    let mut duplicated = stream[..2 * message_len].to_vec();
    duplicated.extend_from_slice(&stream[message_len..2 * message_len]);
    duplicated.extend_from_slice(&stream[2 * message_len..]);

    let mut bytes = fixture.volume_header();
    bytes.extend(test_utils::ldm_record(&duplicated, true));

    let volume = decode_record(&bytes).expect("decode");
    let baseline = decode_record(&fixture.archive_bytes()).expect("baseline");

    let sweep = &volume.sweeps(&Moment::Reflectivity)[0];
    assert_eq!(sweep.az_count, 4, "duplicate must not inflate the count");
    assert!(volume.equivalent(&baseline));
}

#[test]
fn sweep_time_range_ignores_arrival_order() {
    let fixture = VolumeFixture::two_moment(&[0.5], 4, 16);
    let mut stream = fixture.message_stream();
    let message_len = stream.len() / 4;

    // Give the end-marker radial an earlier collection time than the
    // radials before it, as reordered delivery can. The collection
    // milliseconds sit 4 bytes into the radial header (CTM + message
    // header precede it).
    let ms_at = 3 * message_len + 12 + 16 + 4;
    stream[ms_at..ms_at + 4].copy_from_slice(&TEST_BASE_MS.to_be_bytes());

    let mut bytes = fixture.volume_header();
    bytes.extend(test_utils::ldm_record(&stream, true));

    let volume = decode_record(&bytes).expect("decode");
    let sweep = &volume.sweeps(&Moment::Reflectivity)[0];
    let start = sweep.start_time.expect("start time");
    // The latest collection time belongs to the third radial, 100ms in,
    // not to the end-marker radial that arrived last.
    assert_eq!(
        sweep.end_time,
        Some(start + chrono::Duration::milliseconds(100))
    );
}

#[test]
fn no_data_never_decodes_to_zero() {
    let fixture = VolumeFixture::two_moment(&[0.5], 4, 16);
    let volume = decode_record(&fixture.archive_bytes()).expect("decode");
    let sweep = &volume.sweeps(&Moment::Reflectivity)[0];
    for value in &sweep.data {
        assert_ne!(*value, NO_DATA, "fixture has a return in every gate");
    }
}
