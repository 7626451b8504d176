use crate::util::create_with_backoff;
use oxrdf::Triple;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Minimal buffered N-Triples writer: one `<s> <p> <o> .` statement per line,
/// no surrounding document structure. Uses robust create-with-backoff for
/// Windows-friendliness.
///
/// There is no rollback: if a batch dies mid-write, whatever was flushed so
/// far stays on disk.
pub struct NtWriter {
    path: PathBuf,
    w: Option<BufWriter<File>>,
    written: u64,
}

impl NtWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = create_with_backoff(path, 16, 50)?;
        Ok(Self {
            path: path.to_path_buf(),
            w: Some(BufWriter::with_capacity(buf_bytes.max(8 * 1024), f)),
            written: 0,
        })
    }

    /// Serialize one triple. `oxrdf` terms already render in N-Triples form.
    #[inline]
    pub fn write_triple(&mut self, t: &Triple) -> io::Result<()> {
        if let Some(w) = &mut self.w {
            writeln!(w, "{t} .")?;
            self.written += 1;
        }
        Ok(())
    }

    /// Triples written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Explicit flush-and-close so close errors surface instead of being
    /// swallowed by `Drop`.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(mut w) = self.w.take() {
            w.flush()?;
        }
        Ok(())
    }
}
