#[cfg(test)]
mod dispatch_property_tests {
    use proptest::prelude::*;
    use geodecomp_core::prelude::*;

    fn kind() -> impl Strategy<Value = CodecKind> {
        prop_oneof![Just(CodecKind::JpegXr), Just(CodecKind::Basis), Just(CodecKind::Zstd)]
    }

    proptest! {
        #[test]
        fn prop_written_never_exceeds_capacity(
            kind in kind(),
            src in proptest::collection::vec(any::<u8>(), 0..512),
            cap in 0usize..1024,
        ) {
            let dispatcher = Dispatcher::platform_default();
            let mut out = vec![0u8; cap];
            let mut request = CodecRequest::new(kind, &src, &mut out);
            if let Ok(result) = dispatcher.decompress(&mut request) {
                prop_assert!(result.bytes_written() <= cap);
                prop_assert_eq!(result.capacity(), cap);
            }
            let snap = dispatcher.snapshot();
            prop_assert_eq!(snap.counters.requests, 1);
        }

        #[test]
        fn prop_zstd_round_trip_or_capacity_error(
            data in proptest::collection::vec(any::<u8>(), 0..4096),
            cap in 0usize..4096,
        ) {
            let dispatcher = Dispatcher::platform_default();
            let frame = zstd::bulk::compress(&data, 1).unwrap();
            let mut out = vec![0u8; cap];
            let mut request = CodecRequest::new(CodecKind::Zstd, &frame, &mut out);
            match dispatcher.decompress(&mut request) {
                Ok(result) => {
                    prop_assert!(data.len() <= cap);
                    prop_assert_eq!(&out[..result.bytes_written()], &data[..]);
                }
                Err(err) => {
                    prop_assert!(data.len() > cap);
                    prop_assert_eq!(err.status(), CodecStatus::InsufficientCapacity);
                }
            }
        }

        #[test]
        fn prop_unavailable_backends_never_succeed(
            kind in prop_oneof![Just(CodecKind::JpegXr), Just(CodecKind::Basis)],
            src in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            let dispatcher = Dispatcher::platform_default();
            let mut out = vec![0u8; 256];
            let mut request = CodecRequest::new(kind, &src, &mut out);
            let err = dispatcher.decompress(&mut request).unwrap_err();
            prop_assert_eq!(err, CodecError::BackendUnavailable { codec: kind });
        }
    }
}
