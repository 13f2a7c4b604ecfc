//! Build script for toastfall-assets
//!
//! - Parses assets.toml and validates it at compile time
//! - Packs the ASCII-art frames into a palette-indexed bit stream
//! - Writes bitmaps.rs to OUT_DIR

use std::collections::HashMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST: &str = "assets.toml";

struct Sheet {
    width: usize,
    height: usize,
    bpp: usize,
    glyphs: HashMap<char, usize>,
    palette: Vec<u16>,
    frames: Vec<PathBuf>,
    animations: Vec<(String, usize, usize)>,
}

fn main() {
    println!("cargo:rerun-if-changed={}", MANIFEST);
    println!("cargo:rerun-if-changed=build.rs");

    let content = match fs::read_to_string(MANIFEST) {
        Ok(content) => content,
        Err(e) => fail("Failed to read assets.toml", &[e.to_string()]),
    };

    let manifest: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in assets.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let sheet = parse_sheet(&manifest);
    let data = pack_frames(&sheet);

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("bitmaps.rs"), render(&sheet, &data)).unwrap();
}

/// Print a boxed error and abort the build
fn fail(title: &str, errors: &[String]) -> ! {
    let body = errors
        .iter()
        .map(|e| {
            let line = if e.len() > 62 {
                format!("{}...", &e[..59])
            } else {
                e.clone()
            };
            format!("║  • {:<62} ║", line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn int_field(table: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> usize {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if *v > 0 => *v as usize,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be a positive integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

fn parse_sheet(manifest: &toml::Value) -> Sheet {
    let mut errors = Vec::new();

    let Some(sheet) = manifest.get("sheet") else {
        fail("Missing [sheet] section in assets.toml", &[]);
    };
    let width = int_field(sheet, "sheet", "width", &mut errors);
    let height = int_field(sheet, "sheet", "height", &mut errors);
    let bpp = int_field(sheet, "sheet", "bpp", &mut errors);
    if bpp > 8 {
        errors.push(format!("[sheet] bpp must be 1-8, got {}", bpp));
    }
    if width > u16::MAX as usize || height > u16::MAX as usize {
        errors.push("[sheet] width and height must fit in 16 bits".to_string());
    }

    let mut glyphs = HashMap::new();
    let mut palette = Vec::new();
    match manifest.get("palette").and_then(|p| p.as_array()) {
        Some(entries) if !entries.is_empty() => {
            for (i, entry) in entries.iter().enumerate() {
                let glyph = entry.get("glyph").and_then(|g| g.as_str()).unwrap_or("");
                let mut chars = glyph.chars();
                let glyph = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        errors.push(format!("[[palette]] {} glyph must be one character", i));
                        continue;
                    }
                };
                if glyphs.insert(glyph, palette.len()).is_some() {
                    errors.push(format!("[[palette]] glyph '{}' defined twice", glyph));
                }

                let color = entry.get("color").and_then(|c| c.as_str()).unwrap_or("");
                match parse_color(color) {
                    Some(rgb565) => palette.push(rgb565),
                    None => errors.push(format!(
                        "[[palette]] '{}' color must look like #rrggbb",
                        glyph
                    )),
                }
            }
        }
        _ => errors.push("Missing [[palette]] entries".to_string()),
    }
    if bpp <= 8 && palette.len() > 1 << bpp {
        errors.push(format!(
            "{} palette entries do not fit in {} bits per pixel",
            palette.len(),
            bpp
        ));
    }

    let frames: Vec<PathBuf> = match manifest
        .get("frames")
        .and_then(|f| f.get("files"))
        .and_then(|f| f.as_array())
    {
        Some(files) if !files.is_empty() => files
            .iter()
            .filter_map(|f| match f.as_str() {
                Some(path) => Some(PathBuf::from(path)),
                None => {
                    errors.push("[frames] files must be strings".to_string());
                    None
                }
            })
            .collect(),
        _ => {
            errors.push("[frames] missing 'files'".to_string());
            Vec::new()
        }
    };

    let mut animations = Vec::new();
    if let Some(table) = manifest.get("animations").and_then(|a| a.as_table()) {
        for (name, anim) in table {
            let section = format!("animations.{}", name);
            let start = match anim.get("start") {
                Some(toml::Value::Integer(v)) if *v >= 0 => *v as usize,
                _ => {
                    errors.push(format!("[{}] 'start' must be a non-negative integer", section));
                    continue;
                }
            };
            let count = int_field(anim, &section, "count", &mut errors);
            if start + count > frames.len() || start + count > u8::MAX as usize {
                errors.push(format!(
                    "[{}] frames {}..{} exceed the {} frames in the sheet",
                    section,
                    start,
                    start + count,
                    frames.len()
                ));
            }
            animations.push((name.clone(), start, count));
        }
    }

    if !errors.is_empty() {
        fail("Invalid assets.toml", &errors);
    }

    Sheet {
        width,
        height,
        bpp,
        glyphs,
        palette,
        frames,
        animations,
    }
}

/// "#rrggbb" to RGB565
fn parse_color(s: &str) -> Option<u16> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let rgb = u32::from_str_radix(hex, 16).ok()?;
    let (r, g, b) = ((rgb >> 16) as u16, ((rgb >> 8) & 0xFF) as u16, (rgb & 0xFF) as u16);
    Some(((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3))
}

/// Read every frame and pack its palette indices MSB first
fn pack_frames(sheet: &Sheet) -> Vec<u8> {
    let mut errors = Vec::new();
    let mut data = Vec::new();
    let mut bit = 0usize;

    for path in &sheet.frames {
        println!("cargo:rerun-if-changed={}", path.display());

        let art = match fs::read_to_string(Path::new(path)) {
            Ok(art) => art,
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };

        let rows: Vec<&str> = art.lines().collect();
        if rows.len() != sheet.height {
            errors.push(format!(
                "{}: {} rows, expected {}",
                path.display(),
                rows.len(),
                sheet.height
            ));
            continue;
        }

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != sheet.width {
                errors.push(format!(
                    "{}:{}: {} columns, expected {}",
                    path.display(),
                    y + 1,
                    row.chars().count(),
                    sheet.width
                ));
                continue;
            }

            for (x, glyph) in row.chars().enumerate() {
                let Some(&index) = sheet.glyphs.get(&glyph) else {
                    errors.push(format!(
                        "{}:{}:{}: unknown glyph '{}'",
                        path.display(),
                        y + 1,
                        x + 1,
                        glyph
                    ));
                    continue;
                };

                for b in (0..sheet.bpp).rev() {
                    if bit % 8 == 0 {
                        data.push(0u8);
                    }
                    if (index >> b) & 1 == 1 {
                        let last = data.len() - 1;
                        data[last] |= 0x80 >> (bit % 8);
                    }
                    bit += 1;
                }
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid sprite frames", &errors);
    }

    data
}

fn render(sheet: &Sheet, data: &[u8]) -> String {
    let mut out = String::new();
    writeln!(out, "// Generated by build.rs from {}", MANIFEST).unwrap();
    writeln!(out, "pub const SHEET_WIDTH: u16 = {};", sheet.width).unwrap();
    writeln!(out, "pub const SHEET_HEIGHT: u16 = {};", sheet.height).unwrap();
    writeln!(out, "pub const SHEET_BPP: u8 = {};", sheet.bpp).unwrap();
    writeln!(out, "pub const SHEET_FRAMES: u16 = {};", sheet.frames.len()).unwrap();

    write!(out, "pub static SHEET_PALETTE: [u16; {}] = [", sheet.palette.len()).unwrap();
    for color in &sheet.palette {
        write!(out, "0x{:04X},", color).unwrap();
    }
    writeln!(out, "];").unwrap();

    write!(out, "pub static SHEET_DATA: [u8; {}] = [", data.len()).unwrap();
    for (i, byte) in data.iter().enumerate() {
        if i % 16 == 0 {
            out.push('\n');
        }
        write!(out, "0x{:02X},", byte).unwrap();
    }
    writeln!(out, "\n];").unwrap();

    for (name, start, count) in &sheet.animations {
        let name = name.to_uppercase();
        writeln!(out, "pub const {}_START: u8 = {};", name, start).unwrap();
        writeln!(out, "pub const {}_COUNT: u8 = {};", name, count).unwrap();
    }

    out
}
