//! Criterion benchmarks for the pattern engine hot path.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - TypeScript source evaluation (typescript + security registries)
//!   - Markdown evaluation (documentation registry, whole-file checks)

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use codevet::patterns;

static TS_FIXTURE: &str = r#"
import { api } from "./api";

export function handler(req: any) {
  var result = api.call(req);
  if (result == null) {
    console.log("empty result");
  }
  try {
    api.flush();
  } catch (e) {
  }
  const token = "sk-abcdefghijklmnopqrstuvwxyz123456";
  return eval(result);
}
"#;

static MD_FIXTURE: &str = r#"# Deployment guide

## Setup

Install the CLI from https://releases.example.org/cli and authenticate.

### Rollback

TODO: document the rollback window.

## Usage

Run the deploy script.
"#;

fn bench_typescript(c: &mut Criterion) {
    c.bench_function("patterns_typescript_source", |b| {
        b.iter(|| {
            let findings = patterns::evaluate_for_file(black_box(TS_FIXTURE), "src/handler.ts");
            black_box(findings);
        });
    });
}

fn bench_markdown(c: &mut Criterion) {
    c.bench_function("patterns_markdown_guide", |b| {
        b.iter(|| {
            let findings = patterns::evaluate_for_file(black_box(MD_FIXTURE), "docs/deploy.md");
            black_box(findings);
        });
    });
}

fn bench_large_input(c: &mut Criterion) {
    // 200 copies of the fixture approximates a large generated file.
    let large = TS_FIXTURE.repeat(200);
    c.bench_function("patterns_typescript_large", |b| {
        b.iter(|| {
            let findings = patterns::evaluate_for_file(black_box(&large), "src/generated.ts");
            black_box(findings);
        });
    });
}

criterion_group!(benches, bench_typescript, bench_markdown, bench_large_input);
criterion_main!(benches);
