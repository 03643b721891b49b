pub mod decompress;
pub mod fetch;
pub mod gltf;
pub mod obfuscate;

pub use decompress::{is_gzipped, maybe_decompress, GZIP_MAGIC};
pub use fetch::{FileFetcher, HttpFetcher, XorFetcher};
pub use self::gltf::{parse_gltf_scene, GltfParser};
pub use obfuscate::{obfuscate_file, obfuscated_path, xor_bytes, OBFUSCATION_KEY};
