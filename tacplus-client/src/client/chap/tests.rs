use super::*;

#[test]
fn chap_data_layout() {
    let challenge: [u8; CHALLENGE_LENGTH] = core::array::from_fn(|index| index as u8);
    let data = chap_data(7, b"hunter2", &challenge);

    assert_eq!(data.len(), 33);
    assert_eq!(data[0], 7);
    assert_eq!(data[1..17], challenge);
    assert_eq!(
        data[17..],
        [
            // MD5(0x07 || "hunter2" || challenge)
            0x62, 0x4f, 0x9d, 0xcb, 0x5f, 0x70, 0x01, 0x37, 0x83, 0x73, 0x98, 0xd3, 0x91, 0xa7,
            0xb1, 0xa8,
        ]
    );
}

#[test]
fn identifiers_increment_and_wrap() {
    let sequence = ChapIdentifierSequence::starting_at(255);

    assert_eq!(sequence.next_identifier(), 255);
    assert_eq!(sequence.next_identifier(), 0);
    assert_eq!(sequence.next_identifier(), 1);
}

#[test]
fn challenges_differ() {
    // 2^-128 chance of a spurious failure
    assert_ne!(random_challenge(), random_challenge());
}
