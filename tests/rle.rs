use icns_chunks::rle;

/// Splits an encoded stream into (is_run, length) records.
fn records(encoded: &[u8]) -> Vec<(bool, usize)> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < encoded.len() {
        let flag = encoded[pos] as usize;
        if flag >= 128 {
            out.push((true, flag - 125));
            pos += 2;
        } else {
            out.push((false, flag + 1));
            pos += flag + 2;
        }
    }
    out
}

#[test]
fn small() {
    let input = [0x01, 0x02, 0x02, 0x03, 0x03, 0x03, 0x04, 0x04, 0x04, 0x04,
                 0x05, 0x05, 0x05, 0x05, 0x05];
    let encoded = [0x02, 0x01, 0x02, 0x02, // 1, 2, 2
                   0x80, 0x03, // 3* 3
                   0x81, 0x04, // 4* 4
                   0x82, 0x05]; // 5* 5
    assert_eq!(rle::encode(&input), encoded);
    assert_eq!(rle::decode(&encoded).unwrap(), input);
}

#[test]
fn zeros_overload() {
    let encoded = rle::encode(&[0u8; 300]);
    assert_eq!(encoded, [0xff, 0x00, 0xff, 0x00, 0xa5, 0x00]);
    assert_eq!(rle::decode(&encoded).unwrap(), vec![0u8; 300]);
}

#[test]
fn non_repetitive() {
    let input: Vec<u8> = (0..13).flat_map(|_| 0..10u8).collect();
    let encoded = rle::encode(&input);
    assert_eq!(records(&encoded), vec![(false, 128), (false, 2)]);
    assert_eq!(rle::decode(&encoded).unwrap(), input);
}

#[test]
fn run_count_is_minimal() {
    for length in [3usize, 4, 129, 130, 131, 132, 133, 259, 260, 261, 1000] {
        let mut input = vec![1u8];
        input.extend(std::iter::repeat(5u8).take(length));
        input.push(2);
        let encoded = rle::encode(&input);
        let runs = records(&encoded).iter().filter(|(run, _)| *run).count();
        assert_eq!(runs, (length + 129) / 130, "run of {}", length);
        assert_eq!(records(&encoded).len(), runs + 2, "run of {}", length);
        assert_eq!(rle::decode(&encoded).unwrap(), input);
    }
}

#[test]
fn pairs_never_become_runs() {
    let input = [9, 8, 8, 7, 6, 6, 5];
    let encoded = rle::encode(&input);
    assert_eq!(records(&encoded), vec![(false, 7)]);
}

#[test]
fn literals_never_exceed_128() {
    let input: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    let encoded = rle::encode(&input);
    assert!(records(&encoded).iter().all(|&(run, len)| !run && len <= 128));
    assert_eq!(rle::decode(&encoded).unwrap(), input);
}

#[test]
fn round_trip() {
    let mut seed: u32 = 0x1234_5678;
    for length in 0..400 {
        let mut input = Vec::with_capacity(length);
        while input.len() < length {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let value = (seed >> 24) as u8 & 0x03;
            let repeat = ((seed >> 16) & 0x07) as usize;
            for _ in 0..=repeat {
                input.push(value);
            }
        }
        input.truncate(length);
        assert_eq!(rle::decode(&rle::encode(&input)).unwrap(), input);
    }
}

#[test]
fn truncated_input_is_an_error() {
    assert!(rle::decode(&[0x7f, 1, 2, 3]).is_err());
    assert!(rle::decode(&[0x80]).is_err());
}
