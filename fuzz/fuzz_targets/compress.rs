#![no_main]
use libfuzzer_sys::fuzz_target;

use zdeflate::{compress_bound, compress_slice, DeflateConfig};
use zlib_rs::ReturnCode;

fuzz_target!(|input: (DeflateConfig, &[u8])| {
    let (config, data) = input;

    let mut deflated = vec![0; compress_bound(data.len())];
    let deflated = match compress_slice(&mut deflated, data, config) {
        Ok(deflated) => deflated,
        // only the configuration can be rejected
        Err(_) => return,
    };

    let mut output = vec![0u8; data.len()];
    let config = zlib_rs::inflate::InflateConfig { window_bits: -15 };
    let (output, error) = zlib_rs::inflate::uncompress_slice(&mut output, deflated, config);
    assert_eq!(ReturnCode::Ok, error);

    if output != data {
        let path = std::env::temp_dir().join("deflate.txt");
        std::fs::write(&path, data).unwrap();
        eprintln!("saved input file to {path:?}");
    }

    assert_eq!(output, data);
});
