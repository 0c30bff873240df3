use std::io::Write;
use std::path::Path;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use nova_classpath::{ClasspathEntry, ClasspathIndex};
use nova_core::TypeIndex;

fn write_jar(path: &Path, package: &str, classes: usize) {
    let file = std::fs::File::create(path).expect("create bench jar");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for i in 0..classes {
        zip.start_file(format!("{package}/C{i}.class"), options)
            .expect("start jar entry");
        zip.write_all(&[0xCA, 0xFE, 0xBA, 0xBE]).expect("write jar entry");
    }
    zip.finish().expect("finish bench jar");
}

struct Fixture {
    _dir: TempDir,
    entries: Vec<ClasspathEntry>,
}

/// `jars` archives of `per_jar` classes each; the probed class lives in the
/// last one, so every lookup on a fresh index scans the whole classpath.
fn fixture(jars: usize, per_jar: usize) -> Fixture {
    let dir = TempDir::new().expect("bench tempdir");
    let entries = (0..jars)
        .map(|j| {
            let path = dir.path().join(format!("dep{j}.jar"));
            write_jar(&path, &format!("p{j}"), per_jar);
            ClasspathEntry::Jar(path)
        })
        .collect();
    Fixture { _dir: dir, entries }
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("classpath_lookup");
    group.measurement_time(Duration::from_secs(3));
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(10);

    for jars in [1usize, 8] {
        let fixture = fixture(jars, 200);
        let last = format!("p{}.C0", jars - 1);

        group.throughput(Throughput::Elements((jars * 200) as u64));
        group.bench_with_input(BenchmarkId::new("cold", jars), &fixture.entries, |b, entries| {
            b.iter(|| {
                let index = ClasspathIndex::new(entries.clone());
                black_box(index.class_exists(black_box(&last)))
            })
        });

        let warm = ClasspathIndex::new(fixture.entries.clone());
        assert!(warm.class_exists(&last));
        group.bench_function(BenchmarkId::new("warm_miss", jars), |b| {
            b.iter(|| black_box(warm.class_exists(black_box("p0.Missing"))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
