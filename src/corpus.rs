//! Example sources.
//!
//! A corpus is a line-delimited JSON file, gzip-compressed when its name ends
//! in `.gz`. Reading is lazy and forward-only; restarting means calling
//! [`ExampleSource::examples`] again, which re-opens the file from the start.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;

use crate::error::{AspectLinkResult, DataError};
use crate::example::AspectLinkExample;

/// Boxed iterator of decoded examples.
pub type ExampleIter<'a> = Box<dyn Iterator<Item = AspectLinkResult<AspectLinkExample>> + 'a>;

/// Produces a finite, restartable sequence of examples.
pub trait ExampleSource {
    /// Starts a fresh pass over the examples.
    fn examples(&self) -> AspectLinkResult<ExampleIter<'_>>;

    /// Non-authoritative number of examples, used only for progress display.
    fn length_hint(&self) -> Option<u64> {
        None
    }
}

/// Opens `path` for buffered line reading, transparently decompressing `.gz` files.
pub fn open_lines(path: &Path) -> AspectLinkResult<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gzip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Lazily decodes one JSON value per non-blank line.
pub struct JsonLines<T> {
    path: PathBuf,
    reader: Box<dyn BufRead>,
    line: usize,
    buf: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonLines<T> {
    /// Opens a JSONL file (optionally gzip-compressed).
    pub fn open(path: impl Into<PathBuf>) -> AspectLinkResult<Self> {
        let path = path.into();
        let reader = open_lines(&path)?;
        Ok(Self {
            path,
            reader,
            line: 0,
            buf: String::new(),
            _marker: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> Iterator for JsonLines<T> {
    type Item = AspectLinkResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(trimmed).map_err(|source| {
                DataError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.line,
                    source,
                }
                .into()
            }));
        }
    }
}

/// An aspect-linking corpus on disk.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    path: PathBuf,
    length_hint: Option<u64>,
}

impl CorpusFile {
    /// Creates a handle for the corpus at `path`. Nothing is read until iteration.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            length_hint: None,
        }
    }

    /// Attaches a record-count hint for progress display.
    #[must_use]
    pub const fn with_length_hint(mut self, hint: Option<u64>) -> Self {
        self.length_hint = hint;
        self
    }

    /// Path of the corpus file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counts non-blank records with a full pass over the file.
    pub fn count_records(&self) -> AspectLinkResult<u64> {
        let mut count = 0u64;
        for line in open_lines(&self.path)?.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl ExampleSource for CorpusFile {
    fn examples(&self) -> AspectLinkResult<ExampleIter<'_>> {
        Ok(Box::new(JsonLines::<AspectLinkExample>::open(&self.path)?))
    }

    fn length_hint(&self) -> Option<u64> {
        self.length_hint
    }
}

impl ExampleSource for [AspectLinkExample] {
    fn examples(&self) -> AspectLinkResult<ExampleIter<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }

    fn length_hint(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl ExampleSource for Vec<AspectLinkExample> {
    fn examples(&self) -> AspectLinkResult<ExampleIter<'_>> {
        self.as_slice().examples()
    }

    fn length_hint(&self) -> Option<u64> {
        self.as_slice().length_hint()
    }
}
