//! The PackBits-style run-length codec used by legacy icon planes.
//!
//! A stream is a sequence of records, each starting with a flag byte:
//!
//! * `flag >= 128`: a run.  The next byte is repeated `flag - 125` times
//!   (3 to 130 copies).
//! * `flag < 128`: a literal.  The next `flag + 1` bytes (1 to 128) are
//!   copied verbatim.

use log::trace;

use crate::error::CodecError;

/// Shortest run worth encoding as a run record.
const MIN_RUN: usize = 3;
/// Longest run a single record can hold.
const MAX_RUN: usize = 130;
/// Longest literal a single record can hold.
const MAX_LITERAL: usize = 128;

/// Decodes a run-length stream.  Never reads past the end of `input`; a
/// record that claims more bytes than remain is an error.
pub fn decode(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut pos = 0;
    while pos < input.len() {
        let flag = input[pos];
        if flag >= 128 {
            let count = usize::from(flag) - 128 + MIN_RUN;
            let value = *input.get(pos + 1).ok_or(CodecError::Truncated {
                offset: pos,
                needed: 2,
                available: input.len() - pos,
            })?;
            output.resize(output.len() + count, value);
            pos += 2;
        } else {
            let count = usize::from(flag) + 1;
            let start = pos + 1;
            let literal = input.get(start..start + count).ok_or(
                CodecError::Truncated {
                    offset: pos,
                    needed: count + 1,
                    available: input.len() - pos,
                },
            )?;
            output.extend_from_slice(literal);
            pos = start + count;
        }
    }
    trace!("rle: decoded {} bytes into {}", input.len(), output.len());
    Ok(output)
}

/// Decodes a run-length stream that must expand to exactly `expected` bytes.
pub fn decode_exact(input: &[u8], expected: usize) -> Result<Vec<u8>, CodecError> {
    let output = decode(input)?;
    if output.len() != expected {
        return Err(CodecError::LengthMismatch {
            expected,
            actual: output.len(),
        });
    }
    Ok(output)
}

/// Encodes bytes as a run-length stream.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() + input.len() / MAX_LITERAL + 1);
    let mut literal_start = 0;
    let mut pos = 0;
    while pos < input.len() {
        let value = input[pos];
        let run = input[pos..].iter().take_while(|&&byte| byte == value).count();
        if run >= MIN_RUN {
            flush_literal(&input[literal_start..pos], &mut output);
            let mut remaining = run;
            while remaining > 0 {
                let mut chunk = remaining.min(MAX_RUN);
                // Never leave a tail too short to be a run record.
                if remaining - chunk > 0 && remaining - chunk < MIN_RUN {
                    chunk = remaining - MIN_RUN;
                }
                output.push((128 + chunk - MIN_RUN) as u8);
                output.push(value);
                remaining -= chunk;
            }
            pos += run;
            literal_start = pos;
        } else {
            pos += 1;
            if pos - literal_start == MAX_LITERAL {
                flush_literal(&input[literal_start..pos], &mut output);
                literal_start = pos;
            }
        }
    }
    flush_literal(&input[literal_start..], &mut output);
    trace!("rle: encoded {} bytes into {}", input.len(), output.len());
    output
}

fn flush_literal(literal: &[u8], output: &mut Vec<u8>) {
    if !literal.is_empty() {
        debug_assert!(literal.len() <= MAX_LITERAL);
        output.push((literal.len() - 1) as u8);
        output.extend_from_slice(literal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        assert!(encode(&[]).is_empty());
        assert_eq!(decode(&[]), Ok(Vec::new()));
    }

    #[test]
    fn short_runs_stay_literal() {
        let input = [0x01, 0x02, 0x02, 0x03, 0x03, 0x03, 0x04, 0x04, 0x04,
                     0x04, 0x05, 0x05, 0x05, 0x05, 0x05];
        let encoded = [0x02, 0x01, 0x02, 0x02, 0x80, 0x03, 0x81, 0x04, 0x82,
                       0x05];
        assert_eq!(encode(&input), encoded.to_vec());
        assert_eq!(decode(&encoded), Ok(input.to_vec()));
    }

    #[test]
    fn long_run_splits_at_130() {
        let input = vec![0u8; 300];
        let encoded = [0xff, 0x00, 0xff, 0x00, 0xa5, 0x00];
        assert_eq!(encode(&input), encoded.to_vec());
        assert_eq!(decode(&encoded), Ok(input));
    }

    #[test]
    fn run_remainder_below_three_is_rebalanced() {
        // 131 copies split as 128 + 3.
        let mut input = vec![7u8; 131];
        input.push(9);
        assert_eq!(encode(&input), vec![0xfd, 7, 0x80, 7, 0x00, 9]);
        assert_eq!(decode(&encode(&input)), Ok(input));

        // 261 copies split as 130 + 128 + 3.
        let input = vec![7u8; 261];
        assert_eq!(encode(&input), vec![0xff, 7, 0xfd, 7, 0x80, 7]);
        assert_eq!(decode(&encode(&input)), Ok(input));
    }

    #[test]
    fn non_repetitive_splits_at_128() {
        let input: Vec<u8> = (0..130).map(|i| (i % 10) as u8).collect();
        let encoded = encode(&input);
        assert_eq!(encoded.len(), 1 + 128 + 1 + 2);
        assert_eq!(encoded[0], 0x7f);
        assert_eq!(&encoded[1..129], &input[..128]);
        assert_eq!(encoded[129], 0x01);
        assert_eq!(&encoded[130..], &[0x08, 0x09]);
        assert_eq!(decode(&encoded), Ok(input));
    }

    #[test]
    fn literal_then_run_then_literal() {
        let input = [1, 2, 3, 3, 3, 3, 4];
        assert_eq!(encode(&input), vec![0x01, 1, 2, 0x81, 3, 0x00, 4]);
    }

    #[test]
    fn truncated_run() {
        assert_eq!(decode(&[0x00, 0x11, 0x85]),
                   Err(CodecError::Truncated {
                       offset: 2,
                       needed: 2,
                       available: 1,
                   }));
    }

    #[test]
    fn truncated_literal() {
        assert_eq!(decode(&[0x03, 0xaa, 0xbb]),
                   Err(CodecError::Truncated {
                       offset: 0,
                       needed: 5,
                       available: 3,
                   }));
    }

    #[test]
    fn decode_exact_checks_length() {
        assert_eq!(decode_exact(&[0x80, 0x01], 3), Ok(vec![1, 1, 1]));
        assert_eq!(decode_exact(&[0x80, 0x01], 4),
                   Err(CodecError::LengthMismatch {
                       expected: 4,
                       actual: 3,
                   }));
    }

    #[test]
    fn round_trip_mixed() {
        let mut input = Vec::new();
        for i in 0..2000u32 {
            let byte = (i * 7 / 5 % 13) as u8;
            let repeat = if i % 17 == 0 { 200 } else { (i % 4) as usize };
            for _ in 0..=repeat {
                input.push(byte);
            }
        }
        assert_eq!(decode(&encode(&input)), Ok(input));
    }
}
