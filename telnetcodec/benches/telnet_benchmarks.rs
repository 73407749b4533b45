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


//! Benchmarks for telnetcodec performance

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use telnetkit_telnetcodec::{
    TelnetArgument, TelnetCodec, TelnetFrame, TelnetOption, escape, naws,
};
use tokio_util::codec::{Decoder, Encoder};

fn drain(codec: &mut TelnetCodec, buffer: &mut BytesMut) -> usize {
    let mut count = 0;
    while let Some(event) = codec.decode(buffer).unwrap() {
        black_box(event);
        black_box(codec.take_responses());
        count += 1;
    }
    count
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");

    for size in [16, 256, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("ascii", size), size, |b, &size| {
            let data = vec![b'A'; size];
            b.iter(|| escape(black_box(&data)));
        });

        group.bench_with_input(BenchmarkId::new("all_iac", size), size, |b, &size| {
            let data = vec![0xFF; size];
            b.iter(|| escape(black_box(&data)));
        });
    }

    group.finish();
}

fn bench_encode_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_payload");

    for size in [16, 256, 4096].iter() {
        let data: Vec<u8> = (0..*size).map(|i| (i % 256) as u8).collect();
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            let mut codec = TelnetCodec::new();
            let mut buffer = BytesMut::with_capacity(data.len() * 2);

            b.iter(|| {
                buffer.clear();
                codec.encode(black_box(&data[..]), &mut buffer).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_decode_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_data");

    for size in [16, 256, 4096].iter() {
        let wire = escape(&(0..*size).map(|i| (i % 256) as u8).collect::<Vec<u8>>());
        group.throughput(Throughput::Bytes(wire.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &wire, |b, wire| {
            let mut codec = TelnetCodec::new();
            b.iter(|| {
                let mut buffer = BytesMut::from(&wire[..]);
                drain(&mut codec, &mut buffer)
            });
        });
    }

    group.finish();
}

fn bench_decode_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_negotiation");

    let mut encoder = TelnetCodec::new();
    let mut greeting = BytesMut::new();
    for frame in [
        TelnetFrame::Will(TelnetOption::NAWS),
        TelnetFrame::Will(TelnetOption::TTYPE),
        TelnetFrame::Do(TelnetOption::SuppressGoAhead),
        TelnetFrame::Do(TelnetOption::Echo),
        TelnetFrame::Subnegotiate(TelnetArgument::NAWSWindowSize(naws::WindowSize::new(
            132, 43,
        ))),
        TelnetFrame::Subnegotiate(TelnetArgument::TerminalType("xterm-256color".to_string())),
    ] {
        encoder.encode(frame, &mut greeting).unwrap();
    }

    group.bench_function("client_greeting", |b| {
        b.iter(|| {
            let mut codec = TelnetCodec::new();
            let mut buffer = greeting.clone();
            drain(&mut codec, &mut buffer)
        });
    });

    group.finish();
}

criterion_group!(encode_benches, bench_escape, bench_encode_payload);
criterion_group!(decode_benches, bench_decode_data, bench_decode_negotiation);
criterion_main!(encode_benches, decode_benches);
