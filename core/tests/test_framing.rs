// Container framing:
// * magic + records layout, original size persisted per record
// * strict magic validation
// * truncation and oversized lengths are format errors, never panics
// * writer refuses out-of-order records

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::Bytes;
    use parachunk_core::constants::MAGIC_CMP1;
    use parachunk_core::stream::chunking::EncodedChunk;
    use parachunk_core::stream::framing::{
        inspect_container, FrameError, FrameReader, FrameWriter, RecordHeader,
    };
    use parachunk_core::types::{PipelineError, PipelineResult};

    fn record(index: u64, payload: &'static [u8], original_size: u32) -> EncodedChunk {
        EncodedChunk {
            index,
            original_size,
            checksum: 0xDEAD_0000 + index as u32,
            payload: Bytes::from_static(payload),
        }
    }

    fn write_container(records: &[EncodedChunk]) -> Vec<u8> {
        let mut writer = FrameWriter::begin(Vec::new()).unwrap();
        for r in records {
            writer.write_record(r).unwrap();
        }
        writer.finish().unwrap()
    }

    fn read_all(bytes: Vec<u8>) -> PipelineResult<Vec<EncodedChunk>> {
        FrameReader::open(Cursor::new(bytes))?.collect()
    }

    fn sample() -> Vec<EncodedChunk> {
        vec![
            record(0, b"first-payload", 16_384),
            record(1, b"second", 16_384),
            record(2, b"x", 7_232),
        ]
    }

    // --- Layout ---

    #[test]
    fn writer_emits_magic_then_length_prefixed_records() {
        let wire = write_container(&[record(0, b"abc", 10)]);

        assert_eq!(&wire[0..4], b"CMP1");
        assert_eq!(&wire[4..8], &3u32.to_le_bytes());
        assert_eq!(&wire[8..12], &10u32.to_le_bytes());
        assert_eq!(&wire[12..16], &0xDEAD_0000u32.to_le_bytes());
        assert_eq!(&wire[16..], b"abc");
        assert_eq!(wire.len(), 4 + RecordHeader::LEN + 3);
    }

    #[test]
    fn records_read_back_in_order() {
        let records = sample();
        let decoded = read_all(write_container(&records)).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn empty_container_is_just_magic() {
        let wire = write_container(&[]);
        assert_eq!(wire, MAGIC_CMP1.to_vec());
        assert!(read_all(wire).unwrap().is_empty());
    }

    #[test]
    fn writer_tracks_records_and_bytes() {
        let mut writer = FrameWriter::begin(Vec::new()).unwrap();
        for r in sample() {
            writer.write_record(&r).unwrap();
        }
        assert_eq!(writer.records(), 3);
        let expected = 4 + 3 * RecordHeader::LEN + 13 + 6 + 1;
        assert_eq!(writer.bytes_written(), expected as u64);
        assert_eq!(writer.finish().unwrap().len(), expected);
    }

    #[test]
    fn writer_rejects_out_of_order_record() {
        let mut writer = FrameWriter::begin(Vec::new()).unwrap();
        writer.write_record(&record(0, b"a", 1)).unwrap();
        match writer.write_record(&record(2, b"c", 1)) {
            Err(PipelineError::Format(FrameError::OutOfOrder { expected: 1, actual: 2 })) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    // --- Magic ---

    #[test]
    fn invalid_magic_is_rejected() {
        let mut wire = write_container(&sample());
        wire[0..4].copy_from_slice(b"BAD!");

        match FrameReader::open(Cursor::new(wire)) {
            Err(PipelineError::Format(FrameError::InvalidMagic(m))) => assert_eq!(&m, b"BAD!"),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("bad magic accepted"),
        }
    }

    #[test]
    fn short_file_is_truncated_magic() {
        assert!(matches!(
            FrameReader::open(Cursor::new(b"CM".to_vec())),
            Err(PipelineError::Format(FrameError::TruncatedMagic { actual: 2 }))
        ));
        assert!(matches!(
            FrameReader::open(Cursor::new(Vec::new())),
            Err(PipelineError::Format(FrameError::TruncatedMagic { actual: 0 }))
        ));
    }

    // --- Corruption ---

    #[test]
    fn partial_record_header_is_truncated() {
        let mut wire = write_container(&sample());
        wire.truncate(4 + 6);

        match read_all(wire) {
            Err(PipelineError::Format(FrameError::Truncated { index: 0, part: "header", actual: 6, .. })) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn partial_payload_is_truncated() {
        let mut wire = write_container(&sample());
        wire.truncate(wire.len() - 1);

        match read_all(wire) {
            Err(PipelineError::Format(FrameError::Truncated { index: 2, part: "payload", expected: 1, actual: 0 })) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn length_past_end_of_file_is_truncated() {
        let mut wire = write_container(&sample());
        let remaining = (wire.len() - 4 - RecordHeader::LEN) as u32;
        wire[4..8].copy_from_slice(&(remaining + 100).to_le_bytes());

        assert!(matches!(
            read_all(wire),
            Err(PipelineError::Format(FrameError::Truncated { index: 0, part: "payload", .. }))
        ));
    }

    #[test]
    fn absurd_length_is_rejected_before_reading_payload() {
        let mut wire = write_container(&sample());
        wire[4..8].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(matches!(
            read_all(wire),
            Err(PipelineError::Format(FrameError::RecordTooLarge { index: 0, field: "compressed_len", .. }))
        ));
    }

    #[test]
    fn absurd_original_size_is_rejected() {
        let mut wire = write_container(&sample());
        wire[8..12].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(matches!(
            read_all(wire),
            Err(PipelineError::Format(FrameError::RecordTooLarge { field: "original_size", .. }))
        ));
    }

    #[test]
    fn reader_fuses_after_error() {
        let mut wire = write_container(&sample());
        wire.truncate(wire.len() - 1);

        let mut reader = FrameReader::open(Cursor::new(wire)).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    // --- Inspection ---

    #[test]
    fn inspect_reports_every_record() {
        let wire = write_container(&sample());
        let total = wire.len() as u64;
        let summary = inspect_container(Cursor::new(wire)).unwrap();

        let sizes: Vec<u32> = summary.records.iter().map(|r| r.original_size).collect();
        assert_eq!(sizes, vec![16_384, 16_384, 7_232]);
        assert_eq!(summary.total_original(), 40_000);
        assert_eq!(summary.total_compressed(), 13 + 6 + 1);
        assert_eq!(summary.container_bytes, total);
    }
}
