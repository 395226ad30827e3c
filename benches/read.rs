use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use ply_scan::PlyReader;
use std::io::Cursor;

const VERTICES: usize = 50_000;

fn mesh_header(encoding: &str) -> String {
    format!(
        "ply\nformat {encoding} 1.0\n\
element vertex {VERTICES}\n\
property float x\nproperty float y\nproperty float z\n\
element face {}\n\
property list uchar uint vertex_indices\n\
end_header\n",
        VERTICES / 2
    )
}

fn binary_le_mesh() -> Vec<u8> {
    let mut data = mesh_header("binary_little_endian").into_bytes();
    for i in 0..VERTICES {
        for c in 0..3 {
            data.extend_from_slice(&((i * 3 + c) as f32).to_le_bytes());
        }
    }
    for i in 0..VERTICES / 2 {
        data.push(3);
        for v in [i as u32, (i + 1) as u32 % VERTICES as u32, (i + 2) as u32 % VERTICES as u32] {
            data.extend_from_slice(&v.to_le_bytes());
        }
    }
    data
}

fn ascii_mesh() -> Vec<u8> {
    let mut data = mesh_header("ascii").into_bytes();
    for i in 0..VERTICES {
        data.extend_from_slice(
            format!("{} {} {}\n", i * 3, i * 3 + 1, i * 3 + 2).as_bytes(),
        );
    }
    for i in 0..VERTICES / 2 {
        data.extend_from_slice(
            format!("3 {} {} {}\n", i, (i + 1) % VERTICES, (i + 2) % VERTICES).as_bytes(),
        );
    }
    data
}

fn extract_mesh(data: &[u8]) -> (Vec<f32>, Vec<u32>) {
    let mut reader = PlyReader::new(Cursor::new(data.to_vec())).unwrap();
    let pos = reader.find_pos().unwrap();
    let count = reader.element().unwrap().count;
    assert!(reader.load_element());
    let mut positions = vec![0.0f32; 3 * count];
    assert!(reader.extract_properties(&pos, &mut positions));
    assert!(reader.next_element());

    let idx = reader.find_indices().unwrap();
    assert!(reader.load_element());
    let total = reader.sum_of_list_counts(idx).unwrap() as usize;
    let mut indices = vec![0u32; total];
    assert!(reader.extract_list_property(idx, &mut indices));
    (positions, indices)
}

fn skip_vertices(data: &[u8]) -> u64 {
    let mut reader = PlyReader::new(Cursor::new(data.to_vec())).unwrap();
    assert!(reader.next_element());
    let idx = reader.find_indices().unwrap();
    assert!(reader.load_element());
    reader.sum_of_list_counts(idx).unwrap()
}

fn bench_read(c: &mut Criterion) {
    let binary = binary_le_mesh();
    let ascii = ascii_mesh();

    let mut group = c.benchmark_group("full_mesh");
    group.throughput(Throughput::Bytes(binary.len() as u64));
    group.bench_function("binary_le", |b| {
        b.iter(|| extract_mesh(black_box(&binary)))
    });
    group.throughput(Throughput::Bytes(ascii.len() as u64));
    group.bench_function("ascii", |b| b.iter(|| extract_mesh(black_box(&ascii))));
    group.finish();

    let mut group = c.benchmark_group("faces_only");
    group.throughput(Throughput::Bytes(binary.len() as u64));
    group.bench_function("skip_vertices_binary_le", |b| {
        b.iter(|| skip_vertices(black_box(&binary)))
    });
    group.finish();
}

criterion_group!(benches, bench_read);
criterion_main!(benches);
