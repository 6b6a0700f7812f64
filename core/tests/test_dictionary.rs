// Prepared dictionaries bound to sessions.

#[cfg(test)]
mod tests {
    use encoder_core::compression::{
        compress_to_vec, compress_to_vec_with_dictionary, CompressionCodec, EncoderMode,
        EncoderParams, EncoderSession, Operation,
    };
    use encoder_core::dictionary::{prepare_dictionary, SharedDictionaryType};
    use encoder_core::types::SessionError;

    const DICT: &[u8] = b"{\"user_id\": , \"display_name\": \"\", \"email\": \"@example.com\", \
\"created_at\": \"2024-01-01T00:00:00Z\", \"roles\": [\"reader\", \"writer\"], \"active\": true}";

    fn record(i: usize) -> Vec<u8> {
        format!(
            "{{\"user_id\": {}, \"display_name\": \"user{}\", \"email\": \"user{}@example.com\", \
\"created_at\": \"2024-01-01T00:00:00Z\", \"roles\": [\"reader\", \"writer\"], \"active\": true}}",
            i, i, i
        )
        .into_bytes()
    }

    fn zstd_params() -> EncoderParams {
        EncoderParams::new(CompressionCodec::Zstd, 4096).with_quality(9)
    }

    fn decode_with(dict: &[u8], data: &[u8]) -> Vec<u8> {
        use std::io::Read;
        let mut out = Vec::new();
        zstd::stream::Decoder::with_dictionary(data, dict)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn attach_only_while_fresh() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();

        let mut fresh = EncoderSession::new(zstd_params()).unwrap();
        assert!(fresh.attach_dictionary(&dict).unwrap());
        fresh.destroy().unwrap();

        let mut started = EncoderSession::new(zstd_params()).unwrap();
        started.input_region()[..3].copy_from_slice(b"abc");
        started.push(Operation::Process, 3).unwrap();
        let err = started.attach_dictionary(&dict).unwrap_err();
        assert!(matches!(err, SessionError::IllegalState(_)));
        started.destroy().unwrap();
    }

    #[test]
    fn zero_length_push_still_ends_freshness() {
        let mut session = EncoderSession::new(zstd_params()).unwrap();
        session.push(Operation::Process, 0).unwrap();
        assert!(!session.is_fresh());
        let err = session
            .attach_raw_dictionary(DICT, SharedDictionaryType::Raw)
            .unwrap_err();
        assert!(matches!(err, SessionError::IllegalState(_)));
        session.destroy().unwrap();
    }

    fn brotli_decode_with(dict: &[u8], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let (mut ibuf, mut obuf) = (vec![0u8; 4096], vec![0u8; 4096]);
        brotli_decompressor::BrotliDecompressCustomDict(
            &mut &data[..],
            &mut out,
            &mut ibuf,
            &mut obuf,
            dict.to_vec(),
        )
        .unwrap();
        out
    }

    #[test]
    fn brotli_dictionary_roundtrip() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();
        let mut session =
            EncoderSession::with_settings(4096, 5, 22, Some(EncoderMode::Generic)).unwrap();
        assert!(session.attach_dictionary(&dict).unwrap());

        let input = record(42);
        session.input_region()[..input.len()].copy_from_slice(&input);
        session.push(Operation::Finish, input.len()).unwrap();
        let mut out = Vec::new();
        while session.has_more_output() {
            out.extend_from_slice(&session.pull().unwrap());
        }
        assert!(session.is_finished());
        session.destroy().unwrap();

        assert_eq!(brotli_decode_with(DICT, &out), input);
        let plain = compress_to_vec(EncoderParams::new(CompressionCodec::Brotli, 4096).with_quality(5), &input).unwrap();
        assert!(out.len() < plain.len());
    }

    #[test]
    fn brotli_fast_modes_decline_dictionary() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();
        let mut session = EncoderSession::with_settings(4096, 1, 22, None).unwrap();
        assert!(!session.attach_dictionary(&dict).unwrap());
        assert!(session.is_fresh());
        session.destroy().unwrap();

        let err = compress_to_vec_with_dictionary(
            EncoderParams::new(CompressionCodec::Brotli, 4096).with_quality(0),
            &dict,
            b"data",
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::IllegalState(_)));
    }

    #[test]
    fn zstd_quality_still_applies_with_dictionary() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();
        let input: Vec<u8> = (0..2_000).flat_map(record).collect();

        let fast = compress_to_vec_with_dictionary(
            EncoderParams::new(CompressionCodec::Zstd, 64 * 1024).with_quality(1),
            &dict,
            &input,
        )
        .unwrap();
        let strong = compress_to_vec_with_dictionary(
            EncoderParams::new(CompressionCodec::Zstd, 64 * 1024).with_quality(19),
            &dict,
            &input,
        )
        .unwrap();

        assert_ne!(fast, strong);
        assert!(strong.len() < fast.len());
        assert_eq!(decode_with(DICT, &fast), input);
        assert_eq!(decode_with(DICT, &strong), input);
    }

    #[test]
    fn dictionary_roundtrip_and_gain() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();
        let input = record(17);

        let with = compress_to_vec_with_dictionary(zstd_params(), &dict, &input).unwrap();
        let without = compress_to_vec(zstd_params(), &input).unwrap();

        assert_eq!(decode_with(DICT, &with), input);
        assert!(with.len() < without.len());
    }

    #[test]
    fn one_dictionary_many_sessions() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();
        let handles = dict.handle_count();
        for i in 0..4 {
            let input = record(i);
            let out = compress_to_vec_with_dictionary(zstd_params(), &dict, &input).unwrap();
            assert_eq!(decode_with(DICT, &out), input);
        }
        assert_eq!(dict.handle_count(), handles);
    }

    #[test]
    fn session_keeps_dictionary_alive_after_handle_destroyed() {
        let dict = prepare_dictionary(DICT, SharedDictionaryType::Raw).unwrap();
        let mut session = EncoderSession::new(zstd_params()).unwrap();
        assert!(session.attach_dictionary(&dict).unwrap());
        dict.destroy();

        let input = record(3);
        session.input_region()[..input.len()].copy_from_slice(&input);
        session.push(Operation::Finish, input.len()).unwrap();
        let mut out = Vec::new();
        while session.has_more_output() {
            out.extend_from_slice(&session.pull().unwrap());
        }
        assert!(session.is_finished());
        session.destroy().unwrap();
        assert_eq!(decode_with(DICT, &out), input);
    }

    #[test]
    fn invalid_dictionaries() {
        assert!(matches!(
            prepare_dictionary(b"", SharedDictionaryType::Raw),
            Err(SessionError::InvalidArgument(_))
        ));
        assert!(matches!(
            prepare_dictionary(b"no magic here", SharedDictionaryType::Serialized),
            Err(SessionError::InvalidArgument(_))
        ));
    }
}
