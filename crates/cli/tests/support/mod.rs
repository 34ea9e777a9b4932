//! Captured toolchain output for a small two-object tool, laid out the way
//! `DumpDirToolchain` reads it.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const LINK_COMMAND: &str =
    "c++ -O2 lib/CMakeFiles/enc.dir/enc.cc.o lib/libjxl.a -o tools/cjxl -lm -lpthread";

pub const BINARY_SYMBOLS: &str = "\
main T 0000000000001000 0000000000000040
_ZN3jxl6EncodeEv T 0000000000001040 0000000000000100
_ZN3jxl6N_AVX24ConvEv T 0000000000001140 0000000000000060
_ZN3jxl5SpanIhE4sizeEv W 00000000000011a0 0000000000000010
kTable r 0000000000002000 0000000000000080
gCounter B 0000000000003000 0000000000000008
memcpy U
";

pub const ENC_SYMBOLS: &str = "\
main T 0000000000000000 0000000000000040
_ZN3jxl5SpanIhE4sizeEv W 0000000000000000 0000000000000010
memcpy U
";

pub const LIBJXL_SYMBOLS: &str = "\
libjxl.a[encode.cc.o]:
_ZN3jxl6EncodeEv T 0000000000000000 0000000000000100
_ZN3jxl5SpanIhE4sizeEv W 0000000000000000 0000000000000010
kTable r 0000000000000000 0000000000000080
libjxl.a[conv.cc.o]:
_ZN3jxl6N_AVX24ConvEv T 0000000000000000 0000000000000060
gCounter B 0000000000000000 0000000000000008
";

fn write(root: &Path, relative: &str, body: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("fixture parent")).expect("create fixture dir");
    fs::write(path, body).expect("write fixture");
}

/// Write the fixture for target `tools/cjxl` under `root`.
pub fn write_cjxl_dumps(root: &Path) {
    write(root, "commands/tools/cjxl.txt", LINK_COMMAND.as_bytes());
    write(root, "nm/tools/cjxl.txt", BINARY_SYMBOLS.as_bytes());
    write(root, "nm/lib/CMakeFiles/enc.dir/enc.cc.o.txt", ENC_SYMBOLS.as_bytes());
    write(root, "nm/lib/libjxl.a.txt", LIBJXL_SYMBOLS.as_bytes());
    write(root, "objdump/tools/cjxl.txt", b"\ntools/cjxl:     file format elf64-x86-64\n");

    let mut section = Vec::new();
    for (address, size) in [(0x1040u64, 0x70u8), (0x1000, 0x30), (0x11a0, 0x08)] {
        section.extend_from_slice(&address.to_le_bytes());
        section.push(size);
    }
    write(root, "stack_sizes/tools/cjxl.bin", &section);
}
