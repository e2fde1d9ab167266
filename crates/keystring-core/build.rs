use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const KEYCODES: &str = "keycodes.in";

struct KeyLine {
    code: u16,
    name: String,
    aliases: Vec<String>,
}

fn parse_keycodes(content: &str) -> Vec<KeyLine> {
    let mut keys = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let code = fields.next().unwrap();
        let code = u16::from_str_radix(code.trim_start_matches("0x"), 16)
            .unwrap_or_else(|_| panic!("{}:{}: bad key code {:?}", KEYCODES, lineno + 1, code));
        let name = fields
            .next()
            .unwrap_or_else(|| panic!("{}:{}: missing key name", KEYCODES, lineno + 1))
            .to_string();
        keys.push(KeyLine {
            code,
            name,
            aliases: fields.map(str::to_string).collect(),
        });
    }
    keys
}

fn main() {
    let content = fs::read_to_string(KEYCODES).unwrap();
    let keys = parse_keycodes(&content);

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("key_codes.rs");
    let mut f = File::create(&dest_path).unwrap();

    writeln!(f, "impl Key {{").unwrap();
    for key in &keys {
        writeln!(f, "    pub const {}: Key = Key({:#04X});", key.name, key.code).unwrap();
    }
    writeln!(f, "}}\n").unwrap();

    writeln!(f, "/// Canonical key names, one per virtual key code").unwrap();
    writeln!(f, "const KEY_NAMES: &[(u16, &str)] = &[").unwrap();
    for key in &keys {
        writeln!(f, "    ({:#04X}, {:?}),", key.code, key.name).unwrap();
    }
    writeln!(f, "];\n").unwrap();

    writeln!(f, "/// Extra spellings accepted by `key_from_name`").unwrap();
    writeln!(f, "const KEY_ALIASES: &[(&str, u16)] = &[").unwrap();
    for key in &keys {
        for alias in &key.aliases {
            writeln!(f, "    ({:?}, {:#04X}),", alias, key.code).unwrap();
        }
    }
    writeln!(f, "];").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", KEYCODES);
}
