#![no_main]

use libfuzzer_sys::fuzz_target;

// Full traversal: load every element and pull every property out, so the
// row decoders and the extraction paths both see arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    let cursor = std::io::Cursor::new(data);
    let Ok(mut reader) = ply_scan::PlyReader::new(cursor) else {
        return;
    };
    while reader.has_element() {
        if reader.load_element() {
            let Some(element) = reader.element() else {
                break;
            };
            let count = element.count;
            let props: Vec<u32> = (0..element.properties.len() as u32).collect();
            for p in props {
                if let Some(total) = reader.sum_of_list_counts(p) {
                    let mut dest = vec![0f64; total as usize];
                    reader.extract_list_property(p, &mut dest);
                    let tris = reader.num_triangles(p) as usize;
                    let positions = vec![0f32; 3 * count.max(1)];
                    let mut indices = vec![0u32; 3 * tris];
                    reader.extract_triangles(p, &positions, count.max(1), &mut indices);
                } else {
                    let mut dest = vec![0f64; count];
                    reader.extract_properties(&[p], &mut dest);
                }
            }
        }
        if !reader.next_element() {
            break;
        }
    }
});
