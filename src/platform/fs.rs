//! File and filesystem shims, plus the SPIFFS flash filesystem extras.

use std::ops::{Deref, DerefMut};

use crate::core::errors::{EmuError, Result};
use crate::engine::emulator::Emulator;
use crate::engine::value::Value;

/// Origin for [`MockFile::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekMode {
    #[default]
    Set,
    Current,
    End,
}

/// Open mode for [`MockFs::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    Read,
    Write,
    Append,
}

/// An open file. Every operation is answered by the file's own engine.
#[derive(Debug, Default)]
pub struct MockFile {
    emulator: Emulator,
}

super::impl_emulated!(MockFile, emulator);

impl MockFile {
    #[must_use]
    pub fn new(emulator: Emulator) -> Self {
        Self { emulator }
    }

    #[track_caller]
    pub fn write_byte(&mut self, _byte: u8) -> Result<usize> {
        self.emulator.invoke("write")
    }

    #[track_caller]
    pub fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        self.emulator.invoke("write")
    }

    #[track_caller]
    pub fn available(&mut self) -> Result<i32> {
        self.emulator.invoke("available")
    }

    #[track_caller]
    pub fn read_byte(&mut self) -> Result<i32> {
        self.emulator.invoke("read")
    }

    /// Bulk read. A `bytes` value is copied into `buf`; an integer value is
    /// returned as the count without touching `buf`.
    #[track_caller]
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let value = self.emulator.invoke_value("read")?;
        fill_from(&value, buf, "read")
    }

    #[track_caller]
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read(buf)
    }

    #[track_caller]
    pub fn peek(&mut self) -> Result<i32> {
        self.emulator.invoke("peek")
    }

    pub fn flush(&mut self) {}

    #[track_caller]
    pub fn seek(&mut self, _pos: u32, _mode: SeekMode) -> Result<bool> {
        self.emulator.invoke("seek")
    }

    #[track_caller]
    pub fn seek_set(&mut self, pos: u32) -> Result<bool> {
        self.seek(pos, SeekMode::Set)
    }

    #[track_caller]
    pub fn position(&mut self) -> Result<usize> {
        self.emulator.invoke("position")
    }

    #[track_caller]
    pub fn size(&mut self) -> Result<usize> {
        self.emulator.invoke("size")
    }

    #[track_caller]
    pub fn set_buffer_size(&mut self, _size: usize) -> Result<bool> {
        self.emulator.invoke("setBufferSize")
    }

    pub fn close(&mut self) {}

    /// Seconds since the epoch of the last write.
    #[track_caller]
    pub fn last_write(&mut self) -> Result<i64> {
        self.emulator.invoke("getLastWrite")
    }

    #[track_caller]
    pub fn path(&mut self) -> Result<String> {
        self.emulator.invoke("path")
    }

    #[track_caller]
    pub fn name(&mut self) -> Result<String> {
        self.emulator.invoke("name")
    }

    #[track_caller]
    pub fn is_directory(&mut self) -> Result<bool> {
        self.emulator.invoke("isDirectory")
    }

    #[track_caller]
    pub fn seek_dir(&mut self, _position: i64) -> Result<bool> {
        self.emulator.invoke("seekDir")
    }

    #[track_caller]
    pub fn next_file_name(&mut self) -> Result<String> {
        self.emulator.invoke("getNextFileName")
    }

    pub fn rewind_directory(&mut self) {}
}

/// Filesystem operations; every `open` hands back the same shared file.
#[derive(Debug, Default)]
pub struct MockFs {
    emulator: Emulator,
    file: MockFile,
}

super::impl_emulated!(MockFs, emulator);

impl MockFs {
    #[must_use]
    pub fn new(emulator: Emulator) -> Self {
        Self {
            emulator,
            file: MockFile::default(),
        }
    }

    /// Use `file` as the handle returned by [`MockFs::open`].
    #[must_use]
    pub fn with_file(mut self, file: MockFile) -> Self {
        self.file = file;
        self
    }

    pub fn open(&mut self, _path: &str, _mode: OpenMode) -> &mut MockFile {
        &mut self.file
    }

    #[must_use]
    pub const fn file(&self) -> &MockFile {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut MockFile {
        &mut self.file
    }

    #[track_caller]
    pub fn exists(&mut self, _path: &str) -> Result<bool> {
        self.emulator.invoke("exists")
    }

    #[track_caller]
    pub fn remove(&mut self, _path: &str) -> Result<bool> {
        self.emulator.invoke("remove")
    }

    #[track_caller]
    pub fn rename(&mut self, _from: &str, _to: &str) -> Result<bool> {
        self.emulator.invoke("rename")
    }

    #[track_caller]
    pub fn mkdir(&mut self, _path: &str) -> Result<bool> {
        self.emulator.invoke("mkdir")
    }

    #[track_caller]
    pub fn rmdir(&mut self, _path: &str) -> Result<bool> {
        self.emulator.invoke("rmdir")
    }
}

/// SPIFFS mount parameters accepted by [`MockSpiffs::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiffsMount {
    pub format_on_fail: bool,
    pub base_path: String,
    pub max_open_files: u8,
    pub partition_label: Option<String>,
}

impl Default for SpiffsMount {
    fn default() -> Self {
        Self {
            format_on_fail: false,
            base_path: "/spiffs".to_string(),
            max_open_files: 10,
            partition_label: None,
        }
    }
}

/// Flash filesystem: everything [`MockFs`] does plus mount and capacity calls,
/// answered by the same engine.
#[derive(Debug, Default)]
pub struct MockSpiffs {
    fs: MockFs,
}

impl MockSpiffs {
    #[must_use]
    pub fn new(emulator: Emulator) -> Self {
        Self {
            fs: MockFs::new(emulator),
        }
    }

    #[track_caller]
    pub fn begin(&mut self, _mount: &SpiffsMount) -> Result<bool> {
        self.fs.emulator.invoke("begin")
    }

    #[track_caller]
    pub fn format(&mut self) -> Result<bool> {
        self.fs.emulator.invoke("format")
    }

    #[track_caller]
    pub fn total_bytes(&mut self) -> Result<usize> {
        self.fs.emulator.invoke("totalBytes")
    }

    #[track_caller]
    pub fn used_bytes(&mut self) -> Result<usize> {
        self.fs.emulator.invoke("usedBytes")
    }

    pub fn end(&mut self) {}
}

impl Deref for MockSpiffs {
    type Target = MockFs;

    fn deref(&self) -> &MockFs {
        &self.fs
    }
}

impl DerefMut for MockSpiffs {
    fn deref_mut(&mut self) -> &mut MockFs {
        &mut self.fs
    }
}

super::impl_emulated!(MockSpiffs, fs.emulator);

/// Copy a `bytes` payload into `buf`, or read an integer count.
pub(crate) fn fill_from(value: &Value, buf: &mut [u8], method: &str) -> Result<usize> {
    if let Value::Bytes(bytes) = value {
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        return Ok(n);
    }
    value.resolve::<usize>().ok_or_else(|| EmuError::TypeMismatch {
        method: method.to_string(),
        expected: "usize",
        found: value.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Emulated;

    #[test]
    fn file_reads_follow_configured_stages() {
        let mut file = MockFile::default();
        let _ = file.returns("available", 2).times(2).then(0);
        let _ = file
            .returns("read", i32::from(b'o'))
            .then(i32::from(b'k'))
            .then(-1);

        let mut text = String::new();
        while file.available().unwrap() > 0 {
            let byte = file.read_byte().unwrap();
            text.push(char::from(u8::try_from(byte).unwrap()));
        }
        assert_eq!(text, "ok");
        assert_eq!(file.read_byte().unwrap(), -1);
    }

    #[test]
    fn bulk_read_copies_configured_bytes() {
        let mut file = MockFile::default();
        let _ = file.returns("read", b"config=1".to_vec());
        let mut buf = [0_u8; 6];
        assert_eq!(file.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf, b"config");
    }

    #[test]
    fn bulk_read_with_count_leaves_buffer_alone() {
        let mut file = MockFile::default();
        let _ = file.returns("read", 4_usize);
        let mut buf = [7_u8; 8];
        assert_eq!(file.read_bytes(&mut buf).unwrap(), 4);
        assert_eq!(buf, [7; 8]);
    }

    #[test]
    fn bulk_read_rejects_other_types() {
        let mut file = MockFile::default();
        let _ = file.returns("read", "nope");
        assert!(matches!(
            file.read(&mut [0; 4]),
            Err(EmuError::TypeMismatch { found: "str", .. })
        ));
    }

    #[test]
    fn name_and_path_are_separate_methods() {
        let mut file = MockFile::default();
        let _ = file.returns("path", "/spiffs/wifi.json");
        let _ = file.returns("name", "wifi.json");
        assert_eq!(file.path().unwrap(), "/spiffs/wifi.json");
        assert_eq!(file.name().unwrap(), "wifi.json");
    }

    #[test]
    fn open_returns_the_shared_file() {
        let mut fs = MockFs::default();
        let _ = fs.file_mut().returns("size", 128_usize);
        let file = fs.open("/log.txt", OpenMode::Append);
        assert_eq!(file.size().unwrap(), 128);
        assert_eq!(fs.file().emulator().invocations("size"), 1);
    }

    #[test]
    fn fs_exception_surfaces_code() {
        let mut fs = MockFs::default();
        let _ = fs.returns("remove", true);
        fs.set_exception("remove", 13);
        assert_eq!(fs.remove("/a").unwrap_err().exception_code(), Some(13));
    }

    #[test]
    fn spiffs_shares_one_engine_with_fs_calls() {
        let mut spiffs = MockSpiffs::default();
        let _ = spiffs.returns("begin", true);
        let _ = spiffs.returns("exists", false);
        let _ = spiffs.returns("totalBytes", 1_378_241_usize);
        let _ = spiffs.returns("usedBytes", 502_usize);

        assert!(spiffs.begin(&SpiffsMount::default()).unwrap());
        assert!(!spiffs.exists("/config.json").unwrap());
        assert_eq!(spiffs.total_bytes().unwrap(), 1_378_241);
        assert_eq!(spiffs.used_bytes().unwrap(), 502);
        assert_eq!(spiffs.report().summaries().len(), 4);
    }

    #[test]
    fn unconfigured_format_names_the_method() {
        let mut spiffs = MockSpiffs::default();
        let err = spiffs.format().unwrap_err();
        assert!(err.to_string().contains("format()"));
    }
}
