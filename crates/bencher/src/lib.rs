//! Fixtures shared by the decoder benchmarks.

/// A named benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    size: InputSize,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, size: InputSize, file: TestFile) -> Self {
        Self { name, size, file }
    }

    /// A message that fits in a single read.
    pub fn small(name: &'static str, file: TestFile) -> Self {
        Self::new(name, InputSize::Small, file)
    }

    pub fn normal(name: &'static str, file: TestFile) -> Self {
        Self::new(name, InputSize::Normal, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> InputSize {
        self.size
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    /// Raw wire bytes of the fixture.
    pub fn bytes(&self) -> &'static [u8] {
        self.file.content.as_bytes()
    }
}

/// A fixture file embedded with `include_str!`, stored with CRLF line endings.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSize {
    Small,
    Normal,
}
