//! ROM image
//!
//! The cabinet program ships either as one flat binary or as the four
//! 2 KiB parts `.h`, `.g`, `.f`, `.e`, loaded back to back from address 0.

use std::env;
use std::error::Error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use walkdir;

use super::error::CResult;
use super::opcodes;
use super::types::I8Byte;

/// Code region size
const ROM_MAX_SIZE: usize = 0x2000;
const EMPTY_ROM_NAME: &str = "<EMPTY>";

/// Split part extensions, in load order
const PART_EXTENSIONS: [&str; 4] = ["h", "g", "f", "e"];

/// Available flat image extensions
///
/// - No extension ("")
/// - ROM/BIN extension (.rom/.bin)
///
const AVAILABLE_EXTENSIONS: [&str; 3] = ["", "rom", "bin"];

/// ROM image type
pub struct Rom {
    title: String,
    path: String,
    data: Vec<I8Byte>,
}

/// Missing ROM error
#[derive(Debug)]
pub struct MissingRomError(String);

impl Error for MissingRomError {}

impl fmt::Display for MissingRomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ROM image is not found: {}", self.0)
    }
}

impl Rom {
    /// New empty ROM
    pub fn new_empty() -> Self {
        Self {
            title: String::from(EMPTY_ROM_NAME),
            path: String::from(""),
            data: vec![],
        }
    }

    /// Get ROM name from path
    pub fn get_rom_name(path: &Path) -> String {
        match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_uppercase().replace("_", " "),
            None => String::from(EMPTY_ROM_NAME),
        }
    }

    /// Check flat image extension
    fn check_rom_extension(path: &Path) -> bool {
        // Handle empty path
        if path.to_string_lossy().is_empty() {
            return false;
        }

        match path.extension() {
            Some(ext) => match ext.to_string_lossy().as_ref() {
                "rom" | "bin" => true,
                _ => false,
            },
            None => true,
        }
    }

    /// List ROM images from the roms directory.
    pub fn list_from_roms_directory() -> Vec<String> {
        let mut res = vec![];
        let rom_dir = Self::get_roms_directory();

        for entry in walkdir::WalkDir::new(rom_dir.to_str().unwrap())
            .into_iter()
            .filter_map(|e| e.ok())
        {
            // Remove rom_dir from entry
            let fname = entry.path().strip_prefix(&rom_dir).unwrap();
            if Self::check_rom_extension(fname) {
                res.push(fname.to_string_lossy().into_owned());
            }
        }

        res
    }

    /// Load ROM from path.
    ///
    /// A directory is loaded as the four split parts, a file as one flat
    /// image.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to file or directory
    ///
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> CResult<Rom> {
        if path.as_ref().is_dir() {
            return Self::load_from_parts(path.as_ref());
        }

        let mut file = File::open(path.as_ref())
            .map_err(|_| MissingRomError(path.as_ref().to_string_lossy().into_owned()))?;

        let mut contents = Vec::with_capacity(ROM_MAX_SIZE);
        file.read_to_end(&mut contents)?;

        let rom_name = Self::get_rom_name(path.as_ref());
        Rom::load_from_bytes(&rom_name, path.as_ref(), &contents)
    }

    /// Load ROM from a roms directory entry.
    ///
    /// Automatically adds a flat-image extension if not in name.
    ///
    /// # Arguments
    ///
    /// * `name` - ROM name
    ///
    pub fn load_from_roms_directory(name: &str) -> CResult<Rom> {
        let mut rom_path = Rom::get_roms_directory();
        rom_path.push(name);

        for ext in &AVAILABLE_EXTENSIONS {
            rom_path.set_extension(ext);
            debug!("Searching for ROM {:?}...", rom_path);

            if rom_path.exists() {
                return Rom::load_from_path(&rom_path);
            }
        }

        Err(Box::new(MissingRomError(name.to_string())))
    }

    /// Load the four split parts from a directory, in `.h .g .f .e` order.
    fn load_from_parts(dir: &Path) -> CResult<Rom> {
        let mut contents = Vec::with_capacity(ROM_MAX_SIZE);

        for ext in &PART_EXTENSIONS {
            let part = Self::find_part(dir, ext)
                .ok_or_else(|| MissingRomError(format!("{}/*.{}", dir.to_string_lossy(), ext)))?;
            debug!("Loading ROM part {:?}...", part);

            let mut file = File::open(&part)?;
            file.read_to_end(&mut contents)?;
        }

        let rom_name = Self::get_rom_name(dir);
        Rom::load_from_bytes(&rom_name, dir, &contents)
    }

    fn find_part(dir: &Path, extension: &str) -> Option<PathBuf> {
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if let Some(ext) = entry.path().extension() {
                if ext.to_string_lossy() == extension {
                    return Some(entry.path().to_path_buf());
                }
            }
        }

        None
    }

    /// Load ROM from bytes.
    ///
    /// # Arguments
    ///
    /// * `title` - ROM title
    /// * `path` - Origin path
    /// * `bytes` - Bytes contents
    ///
    pub fn load_from_bytes<P: AsRef<Path>>(
        title: &str,
        path: P,
        bytes: &[I8Byte],
    ) -> CResult<Rom> {
        let title = title.to_string();
        let data = bytes.to_vec();
        let path = path.as_ref().to_string_lossy().into_owned();

        Ok(Rom { title, data, path })
    }

    /// Get roms directory.
    fn get_roms_directory() -> PathBuf {
        let cargo_path = match env::var("CARGO_MANIFEST_DIR") {
            Ok(path) => path,
            Err(_) => ".".to_string(),
        };

        Path::new(&cargo_path).join("roms")
    }

    /// Get ROM title.
    pub fn get_title(&self) -> &str {
        &self.title
    }

    /// Get ROM path.
    pub fn get_path(&self) -> &str {
        &self.path
    }

    /// Get internal data.
    pub fn get_data(&self) -> &[I8Byte] {
        &self.data
    }

    /// Disassemble ROM.
    ///
    /// Returns a tuple (addresses, assembly).
    ///
    pub fn disassemble(&self) -> (Vec<usize>, Vec<String>) {
        let mut address_output = Vec::with_capacity(ROM_MAX_SIZE / 2);
        let mut assembly_output = Vec::with_capacity(ROM_MAX_SIZE / 2);
        let mut ptr = 0;

        while ptr < self.data.len() {
            let (assembly, size) = opcodes::disassemble(&self.data, ptr);
            address_output.push(ptr);
            assembly_output.push(assembly);

            ptr += size;
        }

        (address_output, assembly_output)
    }

    /// Write disassembly to file.
    ///
    /// If file is '-', print to console.
    ///
    /// # Arguments
    ///
    /// * `output_file` - Output stream
    ///
    pub fn write_disassembly_to_file(&self, output_file: &str) -> CResult {
        if output_file == "-" {
            println!("> Disassembly:");
            self.write_disassembly_to_stream(&mut io::stdout())?;
        } else {
            println!("> Disassembly dumped to file {}.", output_file);
            let mut file_handle = OpenOptions::new()
                .create(true)
                .write(true)
                .open(output_file)?;

            self.write_disassembly_to_stream(&mut file_handle)?;
        }

        Ok(())
    }

    /// Write disassembly to stream.
    ///
    /// # Arguments
    ///
    /// * `output_stream` - Output stream
    ///
    pub fn write_disassembly_to_stream<W: Write>(&self, output_stream: &mut W) -> CResult {
        let (addresses, assembly) = self.disassemble();

        for i in 0..assembly.len() {
            writeln!(
                output_stream,
                "{:04X}| ({:02X})  {}",
                addresses[i], self.data[addresses[i]], assembly[i]
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_bytes() {
        let example: &[I8Byte] = b"\x3E\x42\xC3\x00\x00";
        let rom = Rom::load_from_bytes("Test", "", example).unwrap();

        let mut disasm_raw = Vec::new();
        rom.write_disassembly_to_stream(&mut disasm_raw).unwrap();
        let disasm_str = ::std::str::from_utf8(&disasm_raw).unwrap();
        let disasm_lines: Vec<_> = disasm_str.split('\n').collect();

        assert_eq!(disasm_lines[0], "0000| (3E)  MVI A,#$42");
        assert_eq!(disasm_lines[1], "0002| (C3)  JMP $0000");
    }

    #[test]
    fn test_load_from_path() {
        use tempdir::TempDir;

        let tmpdir = TempDir::new("test-rom").unwrap();
        let tmppath = tmpdir.path().join("demo.rom");
        std::fs::write(&tmppath, b"\x00\x76").unwrap();

        let rom = Rom::load_from_path(&tmppath).unwrap();
        assert_eq!(rom.get_title(), "DEMO");
        assert_eq!(rom.get_data(), b"\x00\x76");
    }

    #[test]
    fn test_load_from_parts() {
        use tempdir::TempDir;

        let tmpdir = TempDir::new("test-rom-parts").unwrap();
        std::fs::write(tmpdir.path().join("invaders.h"), b"\x01").unwrap();
        std::fs::write(tmpdir.path().join("invaders.g"), b"\x02").unwrap();
        std::fs::write(tmpdir.path().join("invaders.f"), b"\x03").unwrap();
        std::fs::write(tmpdir.path().join("invaders.e"), b"\x04").unwrap();

        let rom = Rom::load_from_path(tmpdir.path()).unwrap();
        assert_eq!(rom.get_data(), b"\x01\x02\x03\x04");
    }

    #[test]
    fn test_load_missing_part() {
        use tempdir::TempDir;

        let tmpdir = TempDir::new("test-rom-missing").unwrap();
        std::fs::write(tmpdir.path().join("invaders.h"), b"\x01").unwrap();

        assert!(Rom::load_from_path(tmpdir.path()).is_err());
    }

    #[test]
    fn test_rom_name() {
        assert_eq!(Rom::get_rom_name(Path::new("invaders.rom")), "INVADERS");
        assert_eq!(
            Rom::get_rom_name(Path::new("sets/space_invaders.bin")),
            "SPACE INVADERS"
        );
        assert_eq!(Rom::get_rom_name(Path::new("")), String::from(EMPTY_ROM_NAME));
    }

    #[test]
    fn test_rom_extension() {
        assert!(Rom::check_rom_extension(Path::new("invaders.rom")));
        assert!(Rom::check_rom_extension(Path::new("sets/invaders.bin")));
        assert!(Rom::check_rom_extension(Path::new("invaders")));
        assert!(!Rom::check_rom_extension(Path::new("notes.txt")));
        assert!(!Rom::check_rom_extension(Path::new("")));
    }
}
