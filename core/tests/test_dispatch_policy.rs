#[cfg(test)]
mod dispatch_policy_tests {
    use geodecomp_core::prelude::*;

    #[test]
    fn empty_input_is_corrupt_for_every_codec() {
        let dispatcher = Dispatcher::platform_default();
        for kind in CodecKind::ALL {
            let mut out = [0u8; 32];
            let mut request = CodecRequest::new(kind, &[], &mut out);
            let err = dispatcher.decompress(&mut request).unwrap_err();
            assert_eq!(err.status(), CodecStatus::CorruptInput, "{}", kind);
        }
        assert_eq!(dispatcher.snapshot().counters.corrupt_input, 3);
    }

    #[test]
    fn disabled_codec_is_unsupported() {
        let config = RegistryConfig::from_json(r#"{ "enabled": ["zstd"] }"#).unwrap();
        let dispatcher = Dispatcher::from_config(config).unwrap();
        assert_eq!(dispatcher.registry().kinds(), vec![CodecKind::Zstd]);

        let mut out = [0u8; 32];
        let mut request = CodecRequest::new(CodecKind::Basis, b"sB", &mut out);
        let err = dispatcher.decompress(&mut request).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedCodec { raw: 2 });
        assert_eq!(err.to_string(), "unsupported codec: Basis");
    }

    #[test]
    fn oversized_source_is_rejected_up_front() {
        let config = RegistryConfig { max_source_len: 8, ..Default::default() };
        let dispatcher = Dispatcher::from_config(config).unwrap();
        let src = zstd::bulk::compress(b"hello geodecomp", 3).unwrap();
        assert!(src.len() > 8);

        let mut out = vec![0u8; 64];
        let mut request = CodecRequest::new(CodecKind::Zstd, &src, &mut out);
        let err = dispatcher.decompress(&mut request).unwrap_err();
        assert!(matches!(err, CodecError::CorruptInput { codec: CodecKind::Zstd, .. }));
    }

    #[test]
    fn decompress_to_vec_respects_output_limit() {
        let config = RegistryConfig { max_output_len: 1024, ..Default::default() };
        let dispatcher = Dispatcher::from_config(config).unwrap();
        let frame = zstd::bulk::compress(&[9u8; 8192], 3).unwrap();
        let err = dispatcher.decompress_to_vec(CodecKind::Zstd, &frame).unwrap_err();
        assert_eq!(err, CodecError::InsufficientCapacity { required: Some(8192), capacity: 1024 });
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = RegistryConfig { max_source_len: 0, ..Default::default() };
        assert!(Dispatcher::from_config(config).is_err());
    }

    #[test]
    fn snapshot_counts_every_request_once() -> anyhow::Result<()> {
        let dispatcher = Dispatcher::platform_default();
        let data = vec![3u8; 2000];
        let frame = zstd::bulk::compress(&data, 3)?;

        let mut out = vec![0u8; 2000];
        let mut request = CodecRequest::new(CodecKind::Zstd, &frame, &mut out);
        dispatcher.decompress(&mut request)?;

        let mut small = vec![0u8; 10];
        let mut request = CodecRequest::new(CodecKind::Zstd, &frame, &mut small);
        assert!(dispatcher.decompress(&mut request).is_err());

        let mut request = CodecRequest::new(CodecKind::JpegXr, b"II", &mut small);
        assert!(dispatcher.decompress(&mut request).is_err());

        let snap = dispatcher.snapshot();
        assert_eq!(snap.counters.requests, 3);
        assert_eq!(snap.counters.successes, 1);
        assert_eq!(snap.failures, 2);
        assert_eq!(snap.counters.insufficient_capacity, 1);
        assert_eq!(snap.counters.backend_unavailable, 1);
        assert_eq!(snap.counters.bytes_in, frame.len() as u64);
        assert_eq!(snap.counters.bytes_out, 2000);
        assert!(snap.expansion_ratio > 1.0);

        let json = snap.to_json()?;
        let back: DispatchSnapshot = serde_json::from_str(&json)?;
        assert_eq!(back.counters, snap.counters);
        Ok(())
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(CodecStatus::UnsupportedCodec as i32, -1);
        assert_eq!(CodecStatus::CorruptInput as i32, -2);
        assert_eq!(CodecStatus::InsufficientCapacity as i32, -3);
        assert_eq!(CodecStatus::UnsupportedTargetFormat as i32, -4);
        assert_eq!(CodecStatus::BackendUnavailable as i32, -5);
        assert_eq!(CodecStatus::InvalidHandle as i32, -6);
    }

    #[test]
    fn raw_ids_resolve() {
        assert_eq!(CodecKind::from_raw(1), Some(CodecKind::JpegXr));
        assert_eq!(CodecKind::from_raw(3), Some(CodecKind::Zstd));
        assert_eq!(CodecKind::from_raw(0), None);
        assert_eq!(TargetFormat::from_raw(13), Some(TargetFormat::Rgba32));
        assert_eq!(TargetFormat::from_raw(7), None);
    }
}
