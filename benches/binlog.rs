use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use replifeed::binlog::{BinlogEventHeader, SessionState};

const INSERT_ROW_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x1e\x01\x00\x00\x00\x37\x00\x00\x00\x80\x01\x00\
                                       \x00\x00\x00\x2d\x0a\x00\x00\x00\x00\x01\x00\x02\x00\x04\xff\xf0\x04\
                                       \x00\x00\x00\x07\x00\x43\x68\x61\x72\x6c\x69\x65\x05\x00\x52\x69\x76\
                                       \x65\x72\xb5\xc0\x0f";

fn parses_insert_row_event(c: &mut Criterion) {
  c.bench_function("parse insert row event", |b| {
    b.iter(|| {
      let mut session = SessionState::default();
      BinlogEventHeader::parse(Bytes::from_static(INSERT_ROW_EVENT), false, &mut session).unwrap()
    })
  });
}

fn parses_table_map_event(c: &mut Criterion) {
  const TABLE_MAP_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x13\x01\x00\x00\x00\x32\x00\x00\x00\x49\x01\x00\
                                        \x00\x00\x00\x2d\x0a\x00\x00\x00\x00\x01\x00\x04\x70\x65\x74\x73\x00\
                                        \x04\x63\x61\x74\x73\x00\x04\x03\x0f\x0f\x0a\x04\x58\x02\x58\x02\x00";

  c.bench_function("parse table map event", |b| {
    b.iter(|| {
      let mut session = SessionState::default();
      BinlogEventHeader::parse(Bytes::from_static(TABLE_MAP_EVENT), false, &mut session).unwrap()
    })
  });
}

criterion_group!(benches, parses_insert_row_event, parses_table_map_event);
criterion_main!(benches);
