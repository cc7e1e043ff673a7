// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for HTTP head parsing and multipart splitting.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use spoolgate_server::http::{find_subsequence, parse_head};
use spoolgate_server::multipart;

const HEAD: &[u8] = b"POST /api/print HTTP/1.1\r\n\
Host: localhost:3000\r\n\
User-Agent: curl/8.5.0\r\n\
Accept: */*\r\n\
Content-Type: application/json\r\n\
Content-Length: 1398102";

/// A form with one document part of `size` bytes and two text parts.
fn form(size: usize) -> Vec<u8> {
    let mut body = b"--bench\r\nContent-Disposition: form-data; name=\"document\"; filename=\"doc.pdf\"\r\n\r\n%PDF-1.7\n".to_vec();
    body.extend((0..size).map(|i| (i % 200) as u8 + 32));
    body.extend_from_slice(
        b"\r\n--bench\r\nContent-Disposition: form-data; name=\"printerId\"\r\n\r\nHP-LaserJet\
          \r\n--bench\r\nContent-Disposition: form-data; name=\"paperSize\"\r\n\r\nA4\
          \r\n--bench--\r\n",
    );
    body
}

fn bench_parse_head(c: &mut Criterion) {
    c.bench_function("parse_head (typical POST)", |b| {
        b.iter(|| {
            let head = parse_head(black_box(HEAD));
            assert!(head.is_ok());
        });
    });

    let mut raw = HEAD.to_vec();
    raw.extend_from_slice(b"\r\n\r\n{\"document\":\"JVBERi0xLjcK\"}");
    c.bench_function("find_subsequence (head terminator)", |b| {
        b.iter(|| find_subsequence(black_box(&raw), b"\r\n\r\n"));
    });
}

fn bench_multipart(c: &mut Criterion) {
    for (label, size) in [("10 KiB", 10 * 1024), ("1 MiB", 1024 * 1024)] {
        let body = form(size);
        c.bench_function(&format!("multipart::parse ({label})"), |b| {
            b.iter(|| {
                let parts = multipart::parse(black_box(&body), "bench").expect("parse");
                assert_eq!(parts.len(), 3);
            });
        });
    }
}

criterion_group!(benches, bench_parse_head, bench_multipart);
criterion_main!(benches);
