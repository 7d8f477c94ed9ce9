//! Byte arrays as C headers.

use std::fmt::Write;

/// Comment and includes written at the top of every generated header.
pub const PREAMBLE: &str = "\
/**
 * file autogenerated by rtb-stylec.
 * you probably don't want to edit this.
 */

#pragma once

#include <stdint.h>
#include <stddef.h>
";

/// Append `data` as comma-separated `0xNN` bytes, one wrapped line at a time.
///
/// Lines hold as many bytes as fit in `line_wrap` columns (indentation not
/// counted) and each starts with `line_start`. Returns the byte count.
pub fn write_hex_data(out: &mut String, data: &[u8], line_wrap: usize, line_start: &str) -> usize {
    let mut line = String::new();

    for byte in data {
        let hex = format!("0x{:02X}, ", byte);

        if !line.is_empty() && line.len() + hex.len() > line_wrap {
            out.push_str(line_start);
            out.push_str(line.trim_end_matches(' '));
            out.push('\n');
            line.clear();
        }

        line.push_str(&hex);
    }

    if !line.is_empty() {
        out.push_str(line_start);
        out.push_str(line.trim_end_matches([' ', ',']));
        out.push('\n');
    }

    data.len()
}

/// Render a full header declaring `<variable>_DATA` and `<variable>_SIZE`.
///
/// `prefix` qualifies the array (e.g. `static`); it may be empty.
pub fn render_header(variable: &str, data: &[u8], prefix: &str, line_wrap: usize) -> String {
    let mut out = String::with_capacity(PREAMBLE.len() + data.len() * 6 + 128);

    out.push_str(PREAMBLE);
    out.push('\n');

    let qualifier = if prefix.is_empty() {
        String::new()
    } else {
        format!("{} ", prefix)
    };
    let _ = writeln!(out, "{}const uint8_t {}_DATA[] = {{", qualifier, variable);

    let size = write_hex_data(&mut out, data, line_wrap, "\t");

    out.push_str("};\n");
    let _ = writeln!(out, "#define {}_SIZE {}", variable, size);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_line_width() {
        let mut out = String::new();
        let n = write_hex_data(&mut out, &[0u8; 12], 79 - 8, "\t");
        assert_eq!(n, 12);

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches("0x00").count(), 11);
        assert!(lines[0].ends_with("0x00,"));
        assert_eq!(lines[1], "\t0x00");
    }

    #[test]
    fn header_layout() {
        let header = render_header("KNOB_TGA", &[0x01, 0xAB], "static", 71);
        assert!(header.starts_with(PREAMBLE));
        assert!(header.contains("static const uint8_t KNOB_TGA_DATA[] = {\n\t0x01, 0xAB\n};\n"));
        assert!(header.ends_with("#define KNOB_TGA_SIZE 2\n"));

        let header = render_header("EMPTY", &[], "", 71);
        assert!(header.contains("\nconst uint8_t EMPTY_DATA[] = {\n};\n"));
        assert!(header.ends_with("#define EMPTY_SIZE 0\n"));
    }
}
