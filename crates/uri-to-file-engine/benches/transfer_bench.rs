// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the copy transfer loop and the external copy in
// the uri-to-file-engine crate.

use std::fs::File;
use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use uri_to_file_bridge::channel::ReaderChannel;
use uri_to_file_bridge::stub::StubBridge;
use uri_to_file_core::SourceReference;
use uri_to_file_engine::external::copy_to_external;
use uri_to_file_engine::task::transfer;

// ---------------------------------------------------------------------------
// Transfer loop
// ---------------------------------------------------------------------------

fn bench_transfer(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let dest_path = dir.path().join("dest.bin");

    let mut group = c.benchmark_group("transfer");
    for size in [64 * 1024usize, 1024 * 1024, 16 * 1024 * 1024] {
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut channel = ReaderChannel::new(Cursor::new(data.as_slice()), data.len() as u64);
                let mut dest = File::create(&dest_path).expect("create");
                black_box(transfer(&mut channel, &mut dest).expect("transfer"))
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// External copy (1 KiB buffer)
// ---------------------------------------------------------------------------

fn bench_copy_to_external(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let content_root = dir.path().join("content");
    let local = dir.path().join("local.bin");
    std::fs::write(&local, vec![0x5a; 1024 * 1024]).expect("write");

    let bridge = StubBridge::with_root(&content_root, dir.path().join("files"));
    let target = SourceReference::parse("content://bench/out.bin").expect("parse");

    let mut group = c.benchmark_group("copy_to_external");
    group.throughput(Throughput::Bytes(1024 * 1024));
    group.bench_function("1MiB", |b| {
        b.iter(|| black_box(copy_to_external(&bridge, &local, &target).expect("copy")));
    });
    group.finish();
}

criterion_group!(benches, bench_transfer, bench_copy_to_external);
criterion_main!(benches);
