pub const BEGIN: &str = "BEGIN";
pub const END: &str = "END";

pub const CONSTANT: &str = "CONSTANT";
pub const INTERNAL: &str = "INTERNAL";
pub const OPEN_CLOSE: &str = "OPEN/CLOSE";
pub const FACTOR: &str = "FACTOR";
pub const IPRN: &str = "IPRN";
pub const BINARY: &str = "BINARY";
pub const LAYERED: &str = "LAYERED";

pub const FILEIN: &str = "FILEIN";
pub const FILEOUT: &str = "FILEOUT";

pub const DEFAULT_INDENT: usize = 2;

pub fn is_array_directive(token: &str) -> bool {
    [CONSTANT, INTERNAL, OPEN_CLOSE]
        .iter()
        .any(|directive| token.eq_ignore_ascii_case(directive))
}

pub fn is_block_end(token: &str) -> bool {
    token.eq_ignore_ascii_case(END)
}

pub fn is_block_begin(token: &str) -> bool {
    token.eq_ignore_ascii_case(BEGIN)
}
