//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! Benchmarks for telnet service operations

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use telnetkit_service::{Connection, LineAssembler, wrap_text};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio::runtime::Runtime;

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
                     tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, \
                     quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo.";

fn bench_wrap_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap_text");
    group.throughput(Throughput::Bytes(LOREM.len() as u64));

    for width in [20usize, 80, 132].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, &width| {
            b.iter(|| wrap_text(black_box(LOREM), width));
        });
    }

    group.finish();
}

fn bench_line_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_assembly");

    let mut input = Vec::new();
    for i in 0..100 {
        input.extend_from_slice(format!("line number {i}\r\n").as_bytes());
    }
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("whole_buffer", |b| {
        b.iter(|| {
            let mut lines = LineAssembler::new();
            black_box(lines.push(black_box(&input)))
        })
    });

    group.bench_function("small_chunks", |b| {
        b.iter(|| {
            let mut lines = LineAssembler::new();
            let mut count = 0;
            for chunk in input.chunks(7) {
                count += lines.push(black_box(chunk)).len();
            }
            black_box(count)
        })
    });

    group.finish();
}

fn bench_connection_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("connection");

    for size in [64usize, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("write", size), size, |b, &size| {
            let payload = vec![b'x'; size];
            b.to_async(&rt).iter(|| {
                let payload = payload.clone();
                async move {
                    let (server, mut client) = duplex(64 * 1024);
                    let conn = Connection::new(server);
                    conn.write(&payload).await.unwrap();
                    let mut sink = vec![0u8; payload.len()];
                    client.read_exact(&mut sink).await.unwrap();
                    black_box(sink)
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("read", size), size, |b, &size| {
            let mut line = vec![b'y'; size - 2];
            line.extend_from_slice(b"\r\n");
            b.to_async(&rt).iter(|| {
                let line = line.clone();
                async move {
                    let (server, mut client) = duplex(64 * 1024);
                    let conn = Connection::new(server);
                    client.write_all(&line).await.unwrap();
                    black_box(conn.read_string().await.unwrap())
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_wrap_text,
    bench_line_assembly,
    bench_connection_roundtrip
);
criterion_main!(benches);
