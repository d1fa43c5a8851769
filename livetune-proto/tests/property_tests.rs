//! Property tests for the wire codec.
//!
//! Host only; proptest needs std.

use livetune_proto::{
    parse_control_update, parse_frame, parse_report, ControlUpdate, ControlValue, Frame,
    MessageBuilder, ReportFrame, Sample, Serialize, Widget, MAX_RECORD_LENGTH,
};
use proptest::prelude::*;

proptest! {
    /// A report frame decodes back to the exact bit patterns it was built from.
    #[test]
    fn report_frame_round_trip(values in proptest::collection::vec(any::<f32>(), 0..16)) {
        let samples: Vec<Sample> = values.iter().copied().map(Sample::from_f32).collect();
        let frame = ReportFrame::new(&samples);
        let mut buf = [0u8; 1 + 4 * 16];
        let len = frame.serialize(&mut buf).unwrap();
        prop_assert_eq!(len, frame.encoded_len());

        let decoded: Vec<u32> = parse_report(&buf[..len])
            .unwrap()
            .map(|s| s.as_f32().to_bits())
            .collect();
        let expected: Vec<u32> = values.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn int_samples_round_trip(values in proptest::collection::vec(any::<i32>(), 1..16)) {
        let samples: Vec<Sample> = values.iter().copied().map(Sample::from_i32).collect();
        let mut buf = [0u8; 1 + 4 * 16];
        let len = ReportFrame::new(&samples).serialize(&mut buf).unwrap();
        let Ok(Frame::Report(decoded)) = parse_frame(&buf[..len]) else {
            panic!("not a report frame");
        };
        let decoded: Vec<i32> = decoded.map(Sample::as_i32).collect();
        prop_assert_eq!(decoded, values);
    }

    /// Serialized control updates parse back to the same update.
    #[test]
    fn control_update_round_trip(
        index in 0u16..1000,
        value in prop_oneof![
            any::<bool>().prop_map(ControlValue::Bool),
            (-100_000i32..100_000).prop_map(|v| ControlValue::Number(v as f32 / 100.0)),
        ],
    ) {
        let update = ControlUpdate::Set { index, value };
        let mut buf = [0u8; 64];
        let len = update.serialize(&mut buf).unwrap();
        prop_assert_eq!(buf[len - 1], b'\n');
        prop_assert_eq!(parse_control_update(&buf[..len]), Ok(update));
    }

    /// Any negative index is a disconnect, whatever follows it.
    #[test]
    fn negative_index_disconnects(index in i32::MIN..0, tail in "[a-z0-9.:]{0,8}") {
        let line = format!("{}:{}\n", index, tail);
        prop_assert_eq!(parse_control_update(line.as_bytes()), Ok(ControlUpdate::Disconnect));
    }

    /// Negative indices too wide for any integer type still disconnect.
    #[test]
    fn wide_negative_index_disconnects(digits in "[1-9][0-9]{9,24}", tail in "[a-z0-9.]{0,4}") {
        let line = format!("-{}:{}\n", digits, tail);
        prop_assert_eq!(parse_control_update(line.as_bytes()), Ok(ControlUpdate::Disconnect));
    }

    /// The parser never panics on arbitrary input.
    #[test]
    fn parser_total(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = parse_control_update(&bytes);
        let _ = parse_frame(&bytes);
    }

    /// Every record stays within the bound used for record buffers.
    #[test]
    fn joystick_record_within_bound(
        title in "[a-zA-Z0-9 ]{0,30}",
        bounds in proptest::array::uniform5(any::<f32>().prop_filter("finite", |v| v.is_finite())),
        sticky in any::<bool>(),
    ) {
        let widget = Widget::Joystick {
            title: &title,
            x_min: bounds[0],
            x_max: bounds[1],
            y_min: bounds[2],
            y_max: bounds[3],
            resolution: bounds[4],
            sticky,
        };
        let mut record = String::new();
        widget.write_record(&mut record).unwrap();
        prop_assert!(record.len() <= MAX_RECORD_LENGTH);
    }
}

#[test]
fn test_builder_matches_serialize() {
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    let len_a = MessageBuilder::control(3).number(0.5).serialize(&mut a).unwrap();
    let len_b = ControlUpdate::Set {
        index: 3,
        value: ControlValue::Number(0.5),
    }
    .serialize(&mut b)
    .unwrap();
    assert_eq!(&a[..len_a], &b[..len_b]);
}
